use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::{Message, MessageStatus, Sender};
use super::stage::Stage;
use crate::error::{CoreError, Result};

/// The synthetic coaching scenario a session is rehearsed against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SessionCase {
    expertise_text: String,
    generated_scenario: String,
}

impl SessionCase {
    pub fn new(expertise_text: impl Into<String>, generated_scenario: impl Into<String>) -> Self {
        Self {
            expertise_text: expertise_text.into(),
            generated_scenario: generated_scenario.into(),
        }
    }

    pub fn expertise_text(&self) -> &str {
        &self.expertise_text
    }

    pub fn generated_scenario(&self) -> &str {
        &self.generated_scenario
    }
}

/// Where a session sits in its lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "phase", content = "stage", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    NotStarted,
    CaseGenerating,
    Active(Stage),
    Completed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::CaseGenerating => "case_generating",
            Self::Active(_) => "active",
            Self::Completed => "completed",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Active(stage) => Some(*stage),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active(stage) => write!(f, "active({})", stage),
            other => f.write_str(other.as_str()),
        }
    }
}

/// The mutable state of one rehearsal.
///
/// `messages` is append-only. The single exception is a pending mentee
/// placeholder, whose content is written exactly once through
/// [`ConversationState::resolve_placeholder`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase", try_from = "StoredConversation")]
pub struct ConversationState {
    messages: Vec<Message>,
    current_stage_index: usize,
    case_generated: bool,
    session_started: bool,
}

/// Wire shape of [`ConversationState`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConversation {
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    current_stage_index: usize,
    #[serde(default)]
    case_generated: bool,
    #[serde(default)]
    session_started: bool,
}

impl TryFrom<StoredConversation> for ConversationState {
    type Error = CoreError;

    fn try_from(stored: StoredConversation) -> Result<Self> {
        if stored.current_stage_index > Stage::last().index() {
            return Err(CoreError::Validation(format!(
                "stage index {} out of range",
                stored.current_stage_index
            )));
        }
        if !stored.session_started
            && (stored.case_generated || stored.current_stage_index > 0 || !stored.messages.is_empty())
        {
            return Err(CoreError::Validation(
                "conversation has content but was never started".to_string(),
            ));
        }
        if stored.session_started && (!stored.case_generated || stored.messages.is_empty()) {
            return Err(CoreError::Validation(
                "started conversation is missing its case".to_string(),
            ));
        }

        Ok(Self {
            messages: stored.messages,
            current_stage_index: stored.current_stage_index,
            case_generated: stored.case_generated,
            session_started: stored.session_started,
        })
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn current_stage_index(&self) -> usize {
        self.current_stage_index
    }

    pub fn current_stage(&self) -> Stage {
        Stage::from_index(self.current_stage_index).unwrap_or_else(Stage::last)
    }

    pub fn case_generated(&self) -> bool {
        self.case_generated
    }

    pub fn session_started(&self) -> bool {
        self.session_started
    }

    pub fn message(&self, id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Record the generated case as the opening mentee message and start the
    /// session.
    pub fn start_with_case(&mut self, case: &SessionCase) -> Result<Uuid> {
        if self.session_started {
            return Err(CoreError::AlreadyStarted);
        }

        let message = Message::mentee(case.generated_scenario()).with_stage(self.current_stage());
        let id = message.id;
        self.messages.push(message);
        self.case_generated = true;
        self.session_started = true;
        Ok(id)
    }

    pub fn append(&mut self, message: Message) -> Uuid {
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Write the final content into a pending placeholder, addressed by id.
    pub fn resolve_placeholder(&mut self, id: Uuid, content: impl Into<String>) -> Result<&Message> {
        let message = self.pending_mut(id)?;
        message.content = content.into();
        message.status = MessageStatus::Final;
        Ok(&*message)
    }

    /// Flag a pending placeholder as failed. Its content stays empty.
    pub fn fail_placeholder(&mut self, id: Uuid) -> Result<&Message> {
        let message = self.pending_mut(id)?;
        message.status = MessageStatus::Failed;
        Ok(&*message)
    }

    fn pending_mut(&mut self, id: Uuid) -> Result<&mut Message> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(CoreError::MessageNotFound(id))?;

        if message.sender != Sender::Mentee || !message.is_pending() {
            return Err(CoreError::PlaceholderNotPending(id));
        }

        Ok(message)
    }

    /// Move to `index` if it is ahead of the current stage.
    ///
    /// Returns the new stage when the index actually moved. Indices past the
    /// last stage are clamped; going backwards is ignored.
    pub fn advance_to(&mut self, index: usize) -> Option<Stage> {
        let bounded = index.min(Stage::last().index());
        if bounded > self.current_stage_index {
            self.current_stage_index = bounded;
            Some(self.current_stage())
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
