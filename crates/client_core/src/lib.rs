use std::sync::Arc;

use shared::domain::{Item, ItemId, ListNumber, Slot};
use tracing::info;

pub mod error;
pub mod source;
pub mod store;
pub mod workflow;

pub use error::{LoadError, WorkflowError};
pub use source::{FileListSource, HttpListSource, ListSource};
pub use store::{DataStore, ListGroup};
pub use workflow::{
    ListView, LoadCompletion, LoadTicket, MergePair, MergeWorkflow, Phase, ToggleOutcome,
    WorkflowView,
};

/// Drives a [`MergeWorkflow`] against a [`ListSource`]. Every entry point
/// runs to completion before the next one is accepted.
pub struct ListMergeClient {
    source: Arc<dyn ListSource>,
    workflow: MergeWorkflow,
}

impl ListMergeClient {
    pub fn new(source: Arc<dyn ListSource>) -> Self {
        Self {
            source,
            workflow: MergeWorkflow::new(),
        }
    }

    pub fn workflow(&self) -> &MergeWorkflow {
        &self.workflow
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn view(&self) -> WorkflowView {
        self.workflow.view()
    }

    pub async fn load(&mut self) -> Result<LoadCompletion, WorkflowError> {
        let Some(ticket) = self.workflow.begin_load()? else {
            return Ok(LoadCompletion::Coalesced);
        };
        info!(source = %self.source.describe(), "loading lists");
        let pending = PendingLoad {
            workflow: &mut self.workflow,
            ticket,
            settled: false,
        };
        let result = self.source.fetch_lists().await;
        pending.finish(result)
    }

    /// Re-issues the load. Safe to call any number of times outside a merge.
    pub async fn retry(&mut self) -> Result<LoadCompletion, WorkflowError> {
        self.load().await
    }

    pub fn toggle_list(&mut self, list: ListNumber) -> Result<ToggleOutcome, WorkflowError> {
        self.workflow.toggle_list(list)
    }

    pub fn start_merge(&mut self) -> Result<MergePair, WorkflowError> {
        self.workflow.start_merge()
    }

    pub fn move_item(&mut self, id: &ItemId, from: Slot, to: Slot) -> Result<(), WorkflowError> {
        self.workflow.move_item(id, from, to)
    }

    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        self.workflow.cancel()
    }

    pub fn commit(&mut self) -> Result<Option<ListNumber>, WorkflowError> {
        self.workflow.commit()
    }
}

/// Keeps the workflow out of `Loading` when a load future is dropped before
/// the fetch returns.
struct PendingLoad<'a> {
    workflow: &'a mut MergeWorkflow,
    ticket: LoadTicket,
    settled: bool,
}

impl PendingLoad<'_> {
    fn finish(
        mut self,
        result: Result<Vec<Item>, LoadError>,
    ) -> Result<LoadCompletion, WorkflowError> {
        self.settled = true;
        self.workflow.complete_load(self.ticket, result)
    }
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.workflow.abandon_load(self.ticket);
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
