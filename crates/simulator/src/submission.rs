use tracing::info;
use trainer_core::{ConversationState, SessionCase, Submission};

use crate::error::{Result, SimulatorError};

/// Packages a finished conversation into its submission record.
pub struct SubmissionAssembler;

impl SubmissionAssembler {
    /// Fails with a state error unless the session has started with a case.
    pub fn build(
        state: &ConversationState,
        case: Option<&SessionCase>,
        mentor_notes: &str,
    ) -> Result<Submission> {
        if !state.session_started() {
            return Err(SimulatorError::NotStarted);
        }
        let case = case.ok_or(SimulatorError::NotStarted)?;

        let submission = Submission::from_state(state, case, mentor_notes.trim())?;
        info!(
            messages = submission.conversation_data().len(),
            completed_stages = submission.completed_stages(),
            total_stages = submission.total_stages(),
            "Submission assembled"
        );

        Ok(submission)
    }
}
