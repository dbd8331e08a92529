use shared::{
    domain::{ItemId, ListNumber, Slot},
    error::{ErrorCode, ErrorNotice},
    protocol::PayloadError,
};
use thiserror::Error;

pub const EXACTLY_TWO_LISTS_MESSAGE: &str =
    "You should select exactly 2 lists to create a new list";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to reach list source: {0}")]
    Transport(String),
    #[error("list source answered with status {0}")]
    Status(u16),
    #[error("malformed list payload: {0}")]
    Malformed(String),
}

impl From<PayloadError> for LoadError {
    fn from(value: PayloadError) -> Self {
        LoadError::Malformed(value.to_string())
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => LoadError::Status(status.as_u16()),
            None if value.is_decode() => LoadError::Malformed(value.to_string()),
            None => LoadError::Transport(value.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{0}")]
    Validation(String),
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl WorkflowError {
    pub fn exactly_two_lists() -> Self {
        WorkflowError::Validation(EXACTLY_TWO_LISTS_MESSAGE.to_string())
    }

    pub fn wrong_phase(operation: &str, phase: impl std::fmt::Display) -> Self {
        WorkflowError::ContractViolation(format!("{operation} is not allowed while {phase}"))
    }

    pub fn unknown_list(list: ListNumber) -> Self {
        WorkflowError::ContractViolation(format!("list {list} does not exist"))
    }

    pub fn inactive_slot(slot: Slot) -> Self {
        WorkflowError::ContractViolation(format!("{slot} is not part of the active merge"))
    }

    pub fn item_not_in(item: &ItemId, slot: Slot) -> Self {
        WorkflowError::ContractViolation(format!("item {item} is not in {slot}"))
    }

    pub fn list_numbers_exhausted() -> Self {
        WorkflowError::Validation(format!(
            "cannot create a new list: no list number is left after {}",
            i64::MAX
        ))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WorkflowError::Load(_) => ErrorCode::Load,
            WorkflowError::Validation(_) => ErrorCode::Validation,
            WorkflowError::ContractViolation(_) => ErrorCode::ContractViolation,
        }
    }

    pub fn notice(&self) -> ErrorNotice {
        ErrorNotice::new(self.code(), self.to_string())
    }
}

impl From<&WorkflowError> for ErrorNotice {
    fn from(value: &WorkflowError) -> Self {
        value.notice()
    }
}
