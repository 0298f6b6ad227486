use thiserror::Error;
use trainer_api::ApiError;
use trainer_core::{CoreError, SessionPhase};
use uuid::Uuid;

/// The three ways a session operation can fail, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input was rejected before any request went out.
    Validation,
    /// The backend or the network failed; the same action can be retried.
    Service,
    /// The operation does not fit the session's current state.
    State,
}

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Backend service error: {0}")]
    Service(#[from] ApiError),

    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Session {0} already has a request in flight")]
    RequestInFlight(Uuid),

    #[error("Session has not started")]
    NotStarted,

    #[error("Session is {0}, expected an active session")]
    NotActive(SessionPhase),

    #[error("Conversation log error: {0}")]
    Conversation(CoreError),
}

impl SimulatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Service(_) => ErrorKind::Service,
            Self::InvalidTransition { .. }
            | Self::RequestInFlight(_)
            | Self::NotStarted
            | Self::NotActive(_)
            | Self::Conversation(_) => ErrorKind::State,
        }
    }

    pub fn invalid_transition(from: SessionPhase, to: SessionPhase) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Service
    }
}

impl From<CoreError> for SimulatorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::NotStarted => Self::NotStarted,
            CoreError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            other => Self::Conversation(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulatorError>;
