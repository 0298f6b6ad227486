use serde::{Deserialize, Serialize};

use super::message::Message;
use super::session::{ConversationState, SessionCase};
use super::stage::TOTAL_STAGES;
use crate::error::{CoreError, Result};

/// Final record of a rehearsal, handed to the backend for review.
///
/// Only obtainable through [`Submission::from_state`], which refuses sessions
/// that never started. There are no setters; a built submission is terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase", try_from = "StoredSubmission")]
pub struct Submission {
    conversation_data: Vec<Message>,
    session_summary: String,
    mentor_notes: String,
    expertise: String,
    completed_stages: usize,
    total_stages: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSubmission {
    conversation_data: Vec<Message>,
    session_summary: String,
    mentor_notes: String,
    expertise: String,
    completed_stages: usize,
    total_stages: usize,
}

impl TryFrom<StoredSubmission> for Submission {
    type Error = CoreError;

    fn try_from(stored: StoredSubmission) -> Result<Self> {
        if stored.total_stages != TOTAL_STAGES {
            return Err(CoreError::Validation(format!(
                "expected {} total stages, got {}",
                TOTAL_STAGES, stored.total_stages
            )));
        }
        if !(1..=TOTAL_STAGES).contains(&stored.completed_stages) {
            return Err(CoreError::Validation(format!(
                "completed stages {} out of range",
                stored.completed_stages
            )));
        }
        // a started session always holds at least the case message
        if stored.conversation_data.is_empty() {
            return Err(CoreError::NotStarted);
        }

        Ok(Self {
            conversation_data: stored.conversation_data,
            session_summary: stored.session_summary,
            mentor_notes: stored.mentor_notes,
            expertise: stored.expertise,
            completed_stages: stored.completed_stages,
            total_stages: stored.total_stages,
        })
    }
}

impl Submission {
    pub fn from_state(
        state: &ConversationState,
        case: &SessionCase,
        mentor_notes: impl Into<String>,
    ) -> Result<Self> {
        if !state.session_started() {
            return Err(CoreError::NotStarted);
        }

        Ok(Self {
            conversation_data: state.messages().to_vec(),
            session_summary: case.generated_scenario().to_string(),
            mentor_notes: mentor_notes.into(),
            expertise: case.expertise_text().to_string(),
            completed_stages: state.current_stage_index() + 1,
            total_stages: TOTAL_STAGES,
        })
    }

    pub fn conversation_data(&self) -> &[Message] {
        &self.conversation_data
    }

    pub fn session_summary(&self) -> &str {
        &self.session_summary
    }

    pub fn mentor_notes(&self) -> &str {
        &self.mentor_notes
    }

    pub fn expertise(&self) -> &str {
        &self.expertise
    }

    pub fn completed_stages(&self) -> usize {
        self.completed_stages
    }

    pub fn total_stages(&self) -> usize {
        self.total_stages
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Submission body for every assignment kind, keyed by `assignmentType`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "assignmentType", rename_all = "snake_case")]
pub enum SubmissionPayload {
    Analysis {
        text: String,
    },
    QuestionAnswer {
        answers: Vec<QuestionAnswer>,
    },
    AiTrainer {
        conversation: Vec<Message>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
    AiSessionTrainer(Submission),
}

impl SubmissionPayload {
    pub fn kind(&self) -> AssignmentKind {
        match self {
            Self::Analysis { .. } => AssignmentKind::Analysis,
            Self::QuestionAnswer { .. } => AssignmentKind::QuestionAnswer,
            Self::AiTrainer { .. } => AssignmentKind::AiTrainer,
            Self::AiSessionTrainer(_) => AssignmentKind::AiSessionTrainer,
        }
    }
}

impl From<Submission> for SubmissionPayload {
    fn from(submission: Submission) -> Self {
        Self::AiSessionTrainer(submission)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Analysis,
    QuestionAnswer,
    AiTrainer,
    AiSessionTrainer,
}

impl AssignmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::QuestionAnswer => "question_answer",
            Self::AiTrainer => "ai_trainer",
            Self::AiSessionTrainer => "ai_session_trainer",
        }
    }

    /// Path segment under `/courses/{course}/assignments/{assignment}/`.
    pub fn submit_endpoint(&self) -> &'static str {
        match self {
            Self::Analysis | Self::QuestionAnswer => "submissions",
            Self::AiTrainer => "ai-trainer-submit",
            Self::AiSessionTrainer => "ai-session-trainer-submit",
        }
    }
}
