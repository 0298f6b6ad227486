//! Session simulator for mentor rehearsal
//!
//! Drives one rehearsal from case generation through the staged conversation
//! to the final submission:
//! - [`SessionCaseGenerator`] produces the opening scenario
//! - [`ConversationOrchestrator`] runs the mentor/mentee exchange
//! - [`StageProgressionPolicy`] moves the conversation through its stages
//! - [`SubmissionAssembler`] packages the finished session
//! - [`TrainerSession`] ties them together behind a single busy guard

pub mod case_generator;
pub mod conversation;
pub mod error;
pub mod resources;
pub mod session;
pub mod stage_policy;
pub mod state_machine;
pub mod submission;

#[cfg(test)]
mod test_support;

pub use case_generator::{validate_expertise, SessionCaseGenerator};
pub use conversation::{validate_content, ConversationOrchestrator, ExchangeReport, PendingExchange};
pub use error::{ErrorKind, Result, SimulatorError};
pub use session::{CompletedSession, Outcome, TrainerSession};
pub use stage_policy::{StageProgressionPolicy, MESSAGES_PER_STAGE};
pub use state_machine::SessionStateMachine;
pub use submission::SubmissionAssembler;
