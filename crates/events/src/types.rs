//! Event types published by rehearsal sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trainer_core::{Sender, Stage};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Everything a presentation layer needs to mirror a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Case generation request went out
    #[serde(rename = "case.requested")]
    CaseRequested { session_id: Uuid },

    /// Case arrived and the session is now active
    #[serde(rename = "case.generated")]
    CaseGenerated { session_id: Uuid, message_id: Uuid },

    /// A message was appended to the log
    #[serde(rename = "message.appended")]
    MessageAppended {
        session_id: Uuid,
        message_id: Uuid,
        sender: Sender,
    },

    /// A pending mentee reply received its content
    #[serde(rename = "reply.resolved")]
    ReplyResolved { session_id: Uuid, message_id: Uuid },

    /// A pending mentee reply's request failed; the placeholder stays visible
    #[serde(rename = "reply.failed")]
    ReplyFailed {
        session_id: Uuid,
        message_id: Uuid,
        error: String,
    },

    /// The conversation moved to the next stage
    #[serde(rename = "stage.advanced")]
    StageAdvanced {
        session_id: Uuid,
        from: Stage,
        to: Stage,
    },

    /// Request in flight state changed (drives loading indicators)
    #[serde(rename = "session.busy")]
    BusyChanged { session_id: Uuid, busy: bool },

    /// Submission accepted by the backend
    #[serde(rename = "session.completed")]
    SessionCompleted {
        session_id: Uuid,
        completed_stages: usize,
    },

    /// Session returned to its initial state
    #[serde(rename = "session.reset")]
    SessionReset { session_id: Uuid, generation: u64 },

    /// A response arrived for a session generation that no longer exists
    #[serde(rename = "response.discarded")]
    StaleResponseDiscarded { session_id: Uuid, generation: u64 },
}

impl Event {
    pub fn session_id(&self) -> Uuid {
        match self {
            Event::CaseRequested { session_id }
            | Event::CaseGenerated { session_id, .. }
            | Event::MessageAppended { session_id, .. }
            | Event::ReplyResolved { session_id, .. }
            | Event::ReplyFailed { session_id, .. }
            | Event::StageAdvanced { session_id, .. }
            | Event::BusyChanged { session_id, .. }
            | Event::SessionCompleted { session_id, .. }
            | Event::SessionReset { session_id, .. }
            | Event::StaleResponseDiscarded { session_id, .. } => *session_id,
        }
    }
}
