//! Maps parsed console commands onto the merge client.

use client_core::{ListMergeClient, LoadCompletion, ToggleOutcome, WorkflowError, WorkflowView};

use crate::commands::{ConsoleCommand, USAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    client: ListMergeClient,
    status: Option<String>,
}

impl Console {
    pub fn new(client: ListMergeClient) -> Self {
        Self {
            client,
            status: None,
        }
    }

    pub fn view(&self) -> WorkflowView {
        self.client.view()
    }

    /// Last outcome line for the user, cleared on read.
    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub async fn load(&mut self) {
        let result = self.client.load().await;
        self.status = self.describe_load(result);
    }

    pub async fn dispatch(&mut self, cmd: ConsoleCommand) -> Flow {
        tracing::debug!(command = cmd.name(), "dispatching console command");

        let status = match cmd {
            ConsoleCommand::Show => None,
            ConsoleCommand::Help => Some(USAGE.to_string()),
            ConsoleCommand::Quit => return Flow::Quit,
            ConsoleCommand::Retry => {
                let result = self.client.retry().await;
                self.describe_load(result)
            }
            ConsoleCommand::Toggle { list } => match self.client.toggle_list(list) {
                Ok(ToggleOutcome::Checked) => Some(format!("checked list {list}")),
                Ok(ToggleOutcome::Unchecked) => Some(format!("unchecked list {list}")),
                // A third list is ignored without comment.
                Ok(ToggleOutcome::Ignored) => return Flow::Continue,
                Err(err) => self.failure(&err),
            },
            ConsoleCommand::Create => match self.client.start_merge() {
                Ok(pair) => Some(format!(
                    "merging list {} and list {}",
                    pair.first, pair.second
                )),
                Err(err) => self.failure(&err),
            },
            ConsoleCommand::Move { item, from, to } => {
                match self.client.move_item(&item, from, to) {
                    Ok(()) => Some(format!("moved {item} from {from} to {to}")),
                    Err(err) => self.failure(&err),
                }
            }
            ConsoleCommand::Cancel => match self.client.cancel() {
                Ok(()) => Some("merge cancelled".to_string()),
                Err(err) => self.failure(&err),
            },
            ConsoleCommand::Update => match self.client.commit() {
                Ok(Some(list)) => Some(format!("created list {list}")),
                Ok(None) => Some("nothing was moved; no list created".to_string()),
                Err(err) => self.failure(&err),
            },
        };

        self.status = status;
        Flow::Continue
    }

    fn describe_load(&self, result: Result<LoadCompletion, WorkflowError>) -> Option<String> {
        match result {
            Ok(LoadCompletion::Applied) => Some("lists loaded".to_string()),
            Ok(LoadCompletion::Coalesced) => Some("a load is already in progress".to_string()),
            Ok(LoadCompletion::Stale) => Some("ignored an outdated response".to_string()),
            Err(err) => self.failure(&err),
        }
    }

    /// Status line for a rejected call. Empty when the view's notice already
    /// shows the same message.
    fn failure(&self, err: &WorkflowError) -> Option<String> {
        let message = err.to_string();
        let shown = self
            .client
            .workflow()
            .notice()
            .is_some_and(|notice| notice.message == message);
        (!shown).then_some(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use client_core::{ListSource, LoadError, Phase};
    use shared::domain::{Item, ItemId, ListNumber, Slot};

    use super::*;

    struct FixedSource(Vec<Item>);

    #[async_trait]
    impl ListSource for FixedSource {
        async fn fetch_lists(&self) -> Result<Vec<Item>, LoadError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ListSource for FailingSource {
        async fn fetch_lists(&self) -> Result<Vec<Item>, LoadError> {
            Err(LoadError::Status(503))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    async fn loaded_console() -> Console {
        let source = FixedSource(vec![
            Item::new("A", "Apple", "", 1),
            Item::new("B", "Banana", "", 1),
            Item::new("C", "Cherry", "", 2),
        ]);
        let mut console = Console::new(ListMergeClient::new(Arc::new(source)));
        console.load().await;
        assert_eq!(console.take_status().as_deref(), Some("lists loaded"));
        console
    }

    #[tokio::test]
    async fn drives_a_merge_to_commit() {
        let mut console = loaded_console().await;

        for cmd in [
            ConsoleCommand::Toggle { list: ListNumber(1) },
            ConsoleCommand::Toggle { list: ListNumber(2) },
            ConsoleCommand::Create,
            ConsoleCommand::Move {
                item: ItemId::new("B"),
                from: Slot::List(ListNumber(1)),
                to: Slot::Pending,
            },
        ] {
            assert_eq!(console.dispatch(cmd).await, Flow::Continue);
        }
        assert_eq!(console.view().phase, Phase::Merging);

        console.dispatch(ConsoleCommand::Update).await;
        assert_eq!(console.take_status().as_deref(), Some("created list 3"));
        assert_eq!(console.view().phase, Phase::Browsing);
    }

    #[tokio::test]
    async fn validation_failure_is_reported_without_phase_change() {
        let mut console = loaded_console().await;
        console
            .dispatch(ConsoleCommand::Toggle { list: ListNumber(1) })
            .await;
        console.dispatch(ConsoleCommand::Create).await;

        assert_eq!(console.take_status(), None);
        let view = console.view();
        let notice = view.notice.expect("notice");
        assert!(notice.message.contains("exactly 2 lists"));
        assert_eq!(view.phase, Phase::Selecting);
    }

    #[tokio::test]
    async fn rejection_is_reported_once() {
        let mut console = loaded_console().await;
        console
            .dispatch(ConsoleCommand::Toggle { list: ListNumber(9) })
            .await;

        let text = crate::render::render_text(&console.view());
        let status = console.take_status();
        let mentions = text.matches("list 9 does not exist").count()
            + status
                .iter()
                .filter(|line| line.contains("list 9 does not exist"))
                .count();
        assert_eq!(mentions, 1);
    }

    #[tokio::test]
    async fn rejection_behind_a_load_failure_keeps_its_status() {
        let mut console = Console::new(ListMergeClient::new(Arc::new(FailingSource)));
        console.load().await;
        assert_eq!(console.take_status(), None);
        assert_eq!(console.view().phase, Phase::Error);

        console.dispatch(ConsoleCommand::Cancel).await;
        let status = console.take_status().expect("status");
        assert!(status.contains("cancel is not allowed"));
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let mut console = loaded_console().await;
        assert_eq!(console.dispatch(ConsoleCommand::Quit).await, Flow::Quit);
    }
}
