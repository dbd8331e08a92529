//! Canonical item collection plus the restore point used by cancel.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use shared::domain::{Item, ItemId, ListNumber};
use tracing::debug;

use crate::error::WorkflowError;

/// Derived grouping of every item sharing one list number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroup {
    pub number: ListNumber,
    pub items: Vec<Item>,
}

#[derive(Debug, Default, Clone)]
pub struct DataStore {
    items: Vec<Item>,
    snapshot: Option<Vec<Item>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn snapshot(&self) -> Option<&[Item]> {
        self.snapshot.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Installs a freshly loaded collection and makes it the baseline.
    pub fn replace(&mut self, items: Vec<Item>) {
        self.snapshot = Some(items.clone());
        self.items = items;
    }

    /// Drops all data, including the baseline.
    pub fn clear(&mut self) {
        self.items.clear();
        self.snapshot = None;
    }

    pub fn take_snapshot(&mut self) {
        self.snapshot = Some(self.items.clone());
    }

    /// Puts back the collection captured by the last snapshot. Returns
    /// `false` and leaves the collection alone when there is none.
    pub fn restore_snapshot(&mut self) -> bool {
        match &self.snapshot {
            Some(snapshot) => {
                self.items = snapshot.clone();
                true
            }
            None => false,
        }
    }

    pub fn list_numbers(&self) -> Vec<ListNumber> {
        self.items
            .iter()
            .map(|item| item.list_number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn contains_list(&self, list: ListNumber) -> bool {
        self.items.iter().any(|item| item.list_number == list)
    }

    pub fn items_in(&self, list: ListNumber) -> impl Iterator<Item = &Item> + '_ {
        self.items
            .iter()
            .filter(move |item| item.list_number == list)
    }

    /// Lists in ascending numeric order, items in collection order.
    pub fn lists(&self) -> Vec<ListGroup> {
        let mut grouped: BTreeMap<ListNumber, Vec<Item>> = BTreeMap::new();
        for item in &self.items {
            grouped
                .entry(item.list_number)
                .or_default()
                .push(item.clone());
        }
        grouped
            .into_iter()
            .map(|(number, items)| ListGroup { number, items })
            .collect()
    }

    /// Removes the item with `id` if it currently belongs to `list`.
    pub fn take_item(&mut self, id: &ItemId, list: ListNumber) -> Option<Item> {
        let index = self
            .items
            .iter()
            .position(|item| &item.id == id && item.list_number == list)?;
        Some(self.items.remove(index))
    }

    /// Appends `item` to the end of the collection under `list`.
    pub fn insert_item(&mut self, mut item: Item, list: ListNumber) {
        self.items.retain(|existing| existing.id != item.id);
        item.list_number = list;
        self.items.push(item);
    }

    /// One past the highest list number seen in either the collection or the
    /// snapshot, so lists emptied during a merge are never reused. `None` once
    /// the numbering has reached `i64::MAX`.
    pub fn next_list_number(&self) -> Option<ListNumber> {
        self.items
            .iter()
            .chain(self.snapshot.iter().flatten())
            .map(|item| item.list_number)
            .max()
            .map_or(Some(ListNumber(1)), ListNumber::next)
    }

    /// Folds `merged` into the collection under a fresh list number and makes
    /// the result the new baseline. Returns the number assigned, or `None`
    /// when there was nothing to merge. Fails without touching the collection
    /// when no number is left to assign.
    pub fn commit(&mut self, merged: &[Item]) -> Result<Option<ListNumber>, WorkflowError> {
        let assigned = if merged.is_empty() {
            None
        } else {
            let number = self
                .next_list_number()
                .ok_or_else(WorkflowError::list_numbers_exhausted)?;
            let merged_ids: HashSet<&ItemId> = merged.iter().map(|item| &item.id).collect();
            self.items.retain(|item| !merged_ids.contains(&item.id));
            self.items.extend(merged.iter().cloned().map(|mut item| {
                item.list_number = number;
                item
            }));
            Some(number)
        };

        debug!(
            items = self.items.len(),
            assigned = ?assigned.map(|number| number.0),
            "committed merged list"
        );
        self.take_snapshot();
        Ok(assigned)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
