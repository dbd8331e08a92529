//! Plain-text and JSON drawing of a [`WorkflowView`].

use std::fmt::Write as _;

use client_core::{Phase, WorkflowView};
use serde::Serialize;
use shared::domain::{Item, ListNumber};

const TITLE: &str = "List Creation";

pub fn render_text(view: &WorkflowView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {TITLE} ==");
    if matches!(view.phase, Phase::Browsing | Phase::Selecting) {
        out.push_str("(type `create` to build a new list from two checked lists)\n");
    }
    if let Some(notice) = view.notice.as_ref().filter(|notice| !notice.is_blocking()) {
        let _ = writeln!(out, "! {}", notice.message);
    }
    out.push('\n');

    match view.phase {
        Phase::Loading => out.push_str("Loading...\n"),
        Phase::Error => render_failure(&mut out, view),
        Phase::Merging => render_merge(&mut out, view),
        Phase::Browsing | Phase::Selecting => render_all_lists(&mut out, view),
    }
    out
}

/// One line of the `--json` output stream.
#[derive(Serialize)]
struct JsonFrame<'a> {
    #[serde(flatten)]
    view: &'a WorkflowView,
    status: Option<&'a str>,
}

/// Encodes the view and the latest status as a single JSON line.
pub fn render_json(view: &WorkflowView, status: Option<&str>) -> serde_json::Result<String> {
    serde_json::to_string(&JsonFrame { view, status })
}

fn render_failure(out: &mut String, view: &WorkflowView) {
    out.push_str("Oops! Something went wrong\n");
    out.push_str("We cannot seem to find the page you are looking for.\n");
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "({})", notice.message);
    }
    out.push_str("Type `retry` to try again.\n");
}

fn render_all_lists(out: &mut String, view: &WorkflowView) {
    if view.lists.is_empty() {
        out.push_str("No lists.\n");
        return;
    }
    for list in &view.lists {
        let mark = if list.checked { 'x' } else { ' ' };
        let _ = writeln!(out, "[{mark}] List {}", list.number);
        render_items(out, &list.items);
        out.push('\n');
    }
}

fn render_merge(out: &mut String, view: &WorkflowView) {
    let Some(pair) = view.active else {
        return;
    };
    let column = |number: ListNumber| {
        view.list(number)
            .map(|list| list.items.as_slice())
            .unwrap_or_default()
    };

    let _ = writeln!(out, "List {}", pair.first);
    render_items(out, column(pair.first));
    let _ = writeln!(out, "\nNew List");
    render_items(out, &view.pending);
    let _ = writeln!(out, "\nList {}", pair.second);
    render_items(out, column(pair.second));
    out.push_str("\n(`move <id> <list> new`, `move <id> new <list>`, then `update` or `cancel`)\n");
}

fn render_items(out: &mut String, items: &[Item]) {
    if items.is_empty() {
        out.push_str("    (empty)\n");
    }
    for item in items {
        let _ = writeln!(out, "    {} {}: {}", item.id, item.name, item.description);
    }
}
