//! Console commands typed by the user.

use shared::domain::{ItemId, ListNumber, Slot};
use thiserror::Error;

pub const USAGE: &str = "\
commands:
  show                         redraw the current view
  toggle <list>                check or uncheck a list
  create                       start merging the two checked lists
  move <item-id> <from> <to>   move an item; <from>/<to> are a list number or `new`
  cancel                       abandon the merge
  update                       commit the merge as a new list
  retry                        load the lists again
  help                         show this message
  quit                         leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Show,
    Toggle { list: ListNumber },
    Create,
    Move { item: ItemId, from: Slot, to: Slot },
    Cancel,
    Update,
    Retry,
    Help,
    Quit,
}

impl ConsoleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ConsoleCommand::Show => "show",
            ConsoleCommand::Toggle { .. } => "toggle",
            ConsoleCommand::Create => "create",
            ConsoleCommand::Move { .. } => "move",
            ConsoleCommand::Cancel => "cancel",
            ConsoleCommand::Update => "update",
            ConsoleCommand::Retry => "retry",
            ConsoleCommand::Help => "help",
            ConsoleCommand::Quit => "quit",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' takes no arguments")]
    UnexpectedArgs(String),
    #[error("'{0}' is not a list number")]
    BadList(String),
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("show" | "ls", []) => ConsoleCommand::Show,
        ("toggle" | "check", [list]) => ConsoleCommand::Toggle {
            list: parse_list(list)?,
        },
        ("toggle" | "check", _) => return Err(CommandError::Usage("toggle <list>")),
        ("create", []) => ConsoleCommand::Create,
        ("move" | "mv", [item, from, to]) => ConsoleCommand::Move {
            item: ItemId::new(*item),
            from: parse_slot(from)?,
            to: parse_slot(to)?,
        },
        ("move" | "mv", _) => return Err(CommandError::Usage("move <item-id> <from> <to>")),
        ("cancel", []) => ConsoleCommand::Cancel,
        ("update" | "commit", []) => ConsoleCommand::Update,
        ("retry", []) => ConsoleCommand::Retry,
        ("help" | "?", _) => ConsoleCommand::Help,
        ("quit" | "exit" | "q", []) => ConsoleCommand::Quit,
        (
            name @ ("show" | "ls" | "create" | "cancel" | "update" | "commit" | "retry" | "quit"
            | "exit" | "q"),
            _,
        ) => return Err(CommandError::UnexpectedArgs(name.to_string())),
        (other, _) => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn parse_list(raw: &str) -> Result<ListNumber, CommandError> {
    raw.parse::<i64>()
        .map(ListNumber)
        .map_err(|_| CommandError::BadList(raw.to_string()))
}

fn parse_slot(raw: &str) -> Result<Slot, CommandError> {
    if raw.eq_ignore_ascii_case("new") {
        return Ok(Slot::Pending);
    }
    parse_list(raw).map(Slot::List)
}
