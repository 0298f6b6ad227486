//! Domain types for the session trainer.
//!
//! Everything here is plain data plus the invariants that protect it; no I/O.

pub mod domain;
pub mod error;

pub use domain::message::{Message, MessageStatus, Sender};
pub use domain::session::{ConversationState, SessionCase, SessionPhase};
pub use domain::stage::{Stage, TOTAL_STAGES};
pub use domain::submission::{AssignmentKind, QuestionAnswer, Submission, SubmissionPayload};
pub use error::{CoreError, Result};
