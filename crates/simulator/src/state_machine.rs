use trainer_core::{SessionPhase, Stage};

use crate::error::{Result, SimulatorError};

/// Legal moves through a rehearsal's lifecycle.
///
/// Reset (`-> NotStarted`) is allowed from every phase.
pub struct SessionStateMachine;

impl SessionStateMachine {
    pub fn validate_transition(from: &SessionPhase, to: &SessionPhase) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(SimulatorError::invalid_transition(*from, *to))
        }
    }

    fn allowed_transitions(from: &SessionPhase) -> Vec<SessionPhase> {
        match from {
            SessionPhase::NotStarted => vec![
                SessionPhase::CaseGenerating,
                SessionPhase::Active(Stage::ClarifyGoal),
                SessionPhase::NotStarted,
            ],
            SessionPhase::CaseGenerating => vec![
                SessionPhase::Active(Stage::ClarifyGoal),
                SessionPhase::NotStarted,
            ],
            SessionPhase::Active(stage) => {
                let mut allowed = vec![SessionPhase::Completed, SessionPhase::NotStarted];
                if let Some(next) = stage.next() {
                    allowed.push(SessionPhase::Active(next));
                }
                allowed
            }
            SessionPhase::Completed => vec![SessionPhase::NotStarted],
        }
    }

    pub fn can_transition(from: &SessionPhase, to: &SessionPhase) -> bool {
        Self::validate_transition(from, to).is_ok()
    }
}
