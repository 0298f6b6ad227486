use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    #[error("Message {0} is not a pending placeholder")]
    PlaceholderNotPending(Uuid),

    #[error("Session has not started")]
    NotStarted,

    #[error("Session has already started")]
    AlreadyStarted,

    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
