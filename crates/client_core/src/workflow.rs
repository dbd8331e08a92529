//! Selection and merge state machine.
//!
//! All state lives in one [`MergeWorkflow`] record tagged by a single
//! [`Phase`]. Every transition checks its guard first and mutates only after
//! the guard passes, so a rejected call leaves the model untouched apart from
//! the user-visible notice.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use shared::{
    domain::{Item, ItemId, ListNumber, Slot},
    error::ErrorNotice,
};
use tracing::{debug, info, warn};

use crate::{
    error::{LoadError, WorkflowError},
    store::DataStore,
};

const MAX_CHECKED_LISTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Error,
    Browsing,
    Selecting,
    Merging,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Loading => "loading",
            Phase::Error => "in the error state",
            Phase::Browsing => "browsing",
            Phase::Selecting => "selecting",
            Phase::Merging => "merging",
        };
        f.write_str(name)
    }
}

/// The two source lists of an active merge, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergePair {
    pub first: ListNumber,
    pub second: ListNumber,
}

impl MergePair {
    fn new(a: ListNumber, b: ListNumber) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    pub fn contains(&self, list: ListNumber) -> bool {
        self.first == list || self.second == list
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadCompletion {
    Applied,
    /// A load was already outstanding; no new fetch was issued.
    Coalesced,
    /// The result belonged to a load that is no longer current.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Checked,
    Unchecked,
    /// Checking would exceed two lists; selection left as it was.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub number: ListNumber,
    pub checked: bool,
    pub items: Vec<Item>,
}

/// Everything a front end needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowView {
    pub phase: Phase,
    pub lists: Vec<ListView>,
    pub pending: Vec<Item>,
    pub active: Option<MergePair>,
    pub notice: Option<ErrorNotice>,
}

impl WorkflowView {
    pub fn list(&self, number: ListNumber) -> Option<&ListView> {
        self.lists.iter().find(|list| list.number == number)
    }
}

#[derive(Debug)]
pub struct MergeWorkflow {
    phase: Phase,
    store: DataStore,
    selection: BTreeSet<ListNumber>,
    pending: Vec<Item>,
    active: Option<MergePair>,
    notice: Option<ErrorNotice>,
    in_flight: Option<LoadTicket>,
    /// Phase to fall back to if the outstanding load is abandoned.
    resume_phase: Phase,
    next_ticket: u64,
}

impl Default for MergeWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeWorkflow {
    pub fn new() -> Self {
        Self {
            phase: Phase::Browsing,
            store: DataStore::new(),
            selection: BTreeSet::new(),
            pending: Vec::new(),
            active: None,
            notice: None,
            in_flight: None,
            resume_phase: Phase::Browsing,
            next_ticket: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn pending(&self) -> &[Item] {
        &self.pending
    }

    pub fn active_pair(&self) -> Option<MergePair> {
        self.active
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref()
    }

    pub fn checked_lists(&self) -> Vec<ListNumber> {
        self.selection.iter().copied().collect()
    }

    pub fn is_checked(&self, list: ListNumber) -> bool {
        self.selection.contains(&list)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a load. Returns `None` when one is already outstanding so
    /// callers never race two fetches.
    pub fn begin_load(&mut self) -> Result<Option<LoadTicket>, WorkflowError> {
        if self.phase == Phase::Merging {
            return Err(self.reject(WorkflowError::wrong_phase("load", self.phase)));
        }
        if self.in_flight.is_some() {
            debug!("load already outstanding; coalescing");
            return Ok(None);
        }

        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        self.resume_phase = self.phase;
        self.phase = Phase::Loading;
        Ok(Some(ticket))
    }

    /// Forgets the load identified by `ticket` without a result, putting the
    /// phase back to what it was before the load began. Returns `false` when
    /// `ticket` is not the outstanding load.
    pub fn abandon_load(&mut self, ticket: LoadTicket) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        self.phase = self.resume_phase;
        warn!(ticket = ticket.0, phase = %self.phase, "load abandoned before completion");
        true
    }

    /// Applies the outcome of the load identified by `ticket`. A failed load
    /// leaves no partial data behind and is returned as an error.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Item>, LoadError>,
    ) -> Result<LoadCompletion, WorkflowError> {
        if self.in_flight != Some(ticket) {
            warn!(ticket = ticket.0, "ignoring result of superseded load");
            return Ok(LoadCompletion::Stale);
        }

        self.in_flight = None;
        self.selection.clear();
        self.pending.clear();
        self.active = None;

        match result {
            Ok(items) => {
                info!(items = items.len(), "lists loaded");
                self.store.replace(items);
                self.notice = None;
                self.phase = Phase::Browsing;
                Ok(LoadCompletion::Applied)
            }
            Err(error) => {
                let error = WorkflowError::Load(error);
                warn!(%error, "failed to load lists");
                self.store.clear();
                self.notice = Some(error.notice());
                self.phase = Phase::Error;
                Err(error)
            }
        }
    }

    pub fn toggle_list(&mut self, list: ListNumber) -> Result<ToggleOutcome, WorkflowError> {
        if !matches!(self.phase, Phase::Browsing | Phase::Selecting) {
            return Err(self.reject(WorkflowError::wrong_phase("toggling a list", self.phase)));
        }
        if !self.store.contains_list(list) {
            return Err(self.reject(WorkflowError::unknown_list(list)));
        }

        let outcome = if self.selection.remove(&list) {
            ToggleOutcome::Unchecked
        } else if self.selection.len() >= MAX_CHECKED_LISTS {
            ToggleOutcome::Ignored
        } else {
            self.selection.insert(list);
            ToggleOutcome::Checked
        };

        self.phase = if self.selection.is_empty() {
            Phase::Browsing
        } else {
            Phase::Selecting
        };
        if outcome != ToggleOutcome::Ignored {
            self.clear_transient_notice();
        }
        debug!(list = list.0, ?outcome, checked = self.selection.len(), "toggled list");
        Ok(outcome)
    }

    pub fn start_merge(&mut self) -> Result<MergePair, WorkflowError> {
        if !matches!(self.phase, Phase::Browsing | Phase::Selecting) {
            return Err(self.reject(WorkflowError::wrong_phase("starting a merge", self.phase)));
        }
        let mut checked = self.selection.iter().copied();
        let (Some(first), Some(second), None) = (checked.next(), checked.next(), checked.next())
        else {
            return Err(self.reject(WorkflowError::exactly_two_lists()));
        };

        let pair = MergePair::new(first, second);
        self.store.take_snapshot();
        self.pending.clear();
        self.active = Some(pair);
        self.notice = None;
        self.phase = Phase::Merging;
        info!(first = pair.first.0, second = pair.second.0, "merge started");
        Ok(pair)
    }

    /// Moves one item between a source list and the pending new list.
    pub fn move_item(&mut self, id: &ItemId, from: Slot, to: Slot) -> Result<(), WorkflowError> {
        let Some(pair) = self.active.filter(|_| self.phase == Phase::Merging) else {
            return Err(self.reject(WorkflowError::wrong_phase("moving an item", self.phase)));
        };

        match (from, to) {
            (Slot::List(source), Slot::Pending) => {
                if !pair.contains(source) {
                    return Err(self.reject(WorkflowError::inactive_slot(from)));
                }
                let Some(item) = self.store.take_item(id, source) else {
                    return Err(self.reject(WorkflowError::item_not_in(id, from)));
                };
                self.pending.push(item);
            }
            (Slot::Pending, Slot::List(destination)) => {
                if !pair.contains(destination) {
                    return Err(self.reject(WorkflowError::inactive_slot(to)));
                }
                let Some(index) = self.pending.iter().position(|item| &item.id == id) else {
                    return Err(self.reject(WorkflowError::item_not_in(id, from)));
                };
                let item = self.pending.remove(index);
                self.store.insert_item(item, destination);
            }
            _ => {
                return Err(self.reject(WorkflowError::ContractViolation(format!(
                    "cannot move item {id} from {from} to {to}; items move between a source list and the new list"
                ))));
            }
        }

        self.clear_transient_notice();
        debug!(item = %id, %from, %to, pending = self.pending.len(), "moved item");
        Ok(())
    }

    /// Abandons the merge and restores the collection captured at merge start.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if self.phase != Phase::Merging {
            return Err(self.reject(WorkflowError::wrong_phase("cancel", self.phase)));
        }

        let restored = self.store.restore_snapshot();
        let discarded = self.pending.len();
        self.leave_merge();
        info!(restored, discarded, "merge cancelled");
        Ok(())
    }

    /// Folds the pending list into the collection under a fresh list number.
    pub fn commit(&mut self) -> Result<Option<ListNumber>, WorkflowError> {
        if self.phase != Phase::Merging {
            return Err(self.reject(WorkflowError::wrong_phase("commit", self.phase)));
        }

        let moved = self.pending.len();
        let assigned = match self.store.commit(&self.pending) {
            Ok(assigned) => assigned,
            Err(error) => return Err(self.reject(error)),
        };
        self.leave_merge();
        info!(moved, list = ?assigned.map(|list| list.0), "merge committed");
        Ok(assigned)
    }

    pub fn view(&self) -> WorkflowView {
        let mut lists: Vec<ListView> = self
            .store
            .lists()
            .into_iter()
            .map(|group| ListView {
                checked: self.selection.contains(&group.number),
                number: group.number,
                items: group.items,
            })
            .collect();

        // A source list emptied during a merge still needs a column.
        if let Some(pair) = self.active {
            for number in [pair.first, pair.second] {
                if let Err(index) = lists.binary_search_by_key(&number, |list| list.number) {
                    lists.insert(
                        index,
                        ListView {
                            number,
                            checked: self.selection.contains(&number),
                            items: Vec::new(),
                        },
                    );
                }
            }
        }

        WorkflowView {
            phase: self.phase,
            lists,
            pending: self.pending.clone(),
            active: self.active,
            notice: self.notice.clone(),
        }
    }

    fn leave_merge(&mut self) {
        self.pending.clear();
        self.selection.clear();
        self.active = None;
        self.notice = None;
        self.phase = Phase::Browsing;
    }

    /// Drops a notice left by a rejected call. Load failures stay until the
    /// next load settles.
    fn clear_transient_notice(&mut self) {
        if !self.notice.as_ref().is_some_and(ErrorNotice::is_blocking) {
            self.notice = None;
        }
    }

    fn reject(&mut self, error: WorkflowError) -> WorkflowError {
        warn!(%error, phase = %self.phase, "rejected workflow call");
        if !self.notice.as_ref().is_some_and(ErrorNotice::is_blocking) {
            self.notice = Some(error.notice());
        }
        error
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
