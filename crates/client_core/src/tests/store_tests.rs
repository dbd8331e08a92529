use super::*;

fn sample_items() -> Vec<Item> {
    vec![
        Item::new("a", "A", "alpha", 1),
        Item::new("b", "B", "bravo", 1),
        Item::new("c", "C", "charlie", 2),
        Item::new("d", "D", "delta", 4),
    ]
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

#[test]
fn replace_sets_baseline_snapshot() {
    let mut store = DataStore::new();
    assert!(store.snapshot().is_none());

    store.replace(sample_items());
    assert_eq!(store.items(), sample_items().as_slice());
    assert_eq!(store.snapshot(), Some(sample_items().as_slice()));
}

#[test]
fn restore_without_snapshot_is_a_no_op() {
    let mut store = DataStore::new();
    assert!(!store.restore_snapshot());
    assert!(store.is_empty());
}

#[test]
fn restore_puts_back_snapshot_verbatim() {
    let mut store = DataStore::new();
    store.replace(sample_items());
    store.take_snapshot();

    let taken = store.take_item(&ItemId::new("a"), ListNumber(1)).expect("take");
    store.insert_item(taken, ListNumber(2));
    assert_ne!(store.items(), sample_items().as_slice());

    assert!(store.restore_snapshot());
    assert_eq!(store.items(), sample_items().as_slice());
}

#[test]
fn lists_are_grouped_and_numerically_ordered() {
    let mut store = DataStore::new();
    store.replace(vec![
        Item::new("x", "X", "", 10),
        Item::new("y", "Y", "", 2),
        Item::new("z", "Z", "", 10),
    ]);

    let lists = store.lists();
    let numbers: Vec<i64> = lists.iter().map(|list| list.number.0).collect();
    assert_eq!(numbers, vec![2, 10]);
    assert_eq!(ids(&lists[1].items), vec!["x", "z"]);
    assert_eq!(store.list_numbers(), vec![ListNumber(2), ListNumber(10)]);
}

#[test]
fn take_item_requires_matching_list() {
    let mut store = DataStore::new();
    store.replace(sample_items());

    assert!(store.take_item(&ItemId::new("a"), ListNumber(2)).is_none());
    assert!(store.take_item(&ItemId::new("missing"), ListNumber(1)).is_none());
    assert_eq!(store.items().len(), 4);

    let taken = store.take_item(&ItemId::new("a"), ListNumber(1)).expect("take");
    assert_eq!(taken.name, "A");
    assert_eq!(ids(store.items()), vec!["b", "c", "d"]);
}

#[test]
fn next_list_number_covers_snapshot() {
    let mut store = DataStore::new();
    store.replace(sample_items());
    store.take_snapshot();
    store.take_item(&ItemId::new("d"), ListNumber(4)).expect("take");

    assert_eq!(store.next_list_number(), Some(ListNumber(5)));
}

#[test]
fn next_list_number_on_empty_store_is_one() {
    assert_eq!(DataStore::new().next_list_number(), Some(ListNumber(1)));
}

#[test]
fn commit_assigns_fresh_number_and_keeps_untouched_items() {
    let mut store = DataStore::new();
    store.replace(sample_items());
    store.take_snapshot();

    let a = store.take_item(&ItemId::new("a"), ListNumber(1)).expect("a");
    let c = store.take_item(&ItemId::new("c"), ListNumber(2)).expect("c");

    let assigned = store.commit(&[a, c]).expect("commit");
    assert_eq!(assigned, Some(ListNumber(5)));

    let lists = store.lists();
    let summary: Vec<(i64, Vec<&str>)> = lists
        .iter()
        .map(|list| (list.number.0, ids(&list.items)))
        .collect();
    assert_eq!(
        summary,
        vec![(1, vec!["b"]), (4, vec!["d"]), (5, vec!["a", "c"])]
    );
    assert_eq!(store.snapshot(), Some(store.items()));
}

#[test]
fn commit_never_duplicates_ids() {
    let mut store = DataStore::new();
    store.replace(sample_items());

    let stale_copy = Item::new("b", "B", "bravo", 1);
    store.commit(&[stale_copy]).expect("commit");

    let b_count = store
        .items()
        .iter()
        .filter(|item| item.id == ItemId::new("b"))
        .count();
    assert_eq!(b_count, 1);
    assert_eq!(store.items().len(), 4);
}

#[test]
fn commit_with_nothing_merged_assigns_nothing() {
    let mut store = DataStore::new();
    store.replace(sample_items());

    assert_eq!(store.commit(&[]).expect("commit"), None);
    assert_eq!(store.items(), sample_items().as_slice());
}

#[test]
fn commit_fails_untouched_when_numbers_run_out() {
    let mut store = DataStore::new();
    store.replace(vec![
        Item::new("a", "A", "alpha", 1),
        Item::new("z", "Z", "zulu", i64::MAX),
    ]);
    assert_eq!(store.next_list_number(), None);

    let a = store.take_item(&ItemId::new("a"), ListNumber(1)).expect("a");
    let before = store.items().to_vec();

    let error = store.commit(&[a]).expect_err("no number left");
    assert!(matches!(error, WorkflowError::Validation(_)));
    assert_eq!(store.items(), before.as_slice());
}
