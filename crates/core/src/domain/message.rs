use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// Who authored a message in a rehearsal conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Mentor,
    Mentee,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentor => "mentor",
            Self::Mentee => "mentee",
        }
    }
}

/// Delivery state of a message's content.
///
/// Only mentee placeholders ever leave `Final`: they start `Pending` and end
/// either `Final` (reply arrived) or `Failed` (request errored, content stays
/// empty).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Final,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<Stage>,
    #[serde(default)]
    pub status: MessageStatus,
}

impl Message {
    fn new(sender: Sender, content: String, status: MessageStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content,
            timestamp: Utc::now(),
            stage_id: None,
            status,
        }
    }

    pub fn mentor(content: impl Into<String>) -> Self {
        Self::new(Sender::Mentor, content.into(), MessageStatus::Final)
    }

    pub fn mentee(content: impl Into<String>) -> Self {
        Self::new(Sender::Mentee, content.into(), MessageStatus::Final)
    }

    /// An empty mentee reply awaiting the generation service.
    pub fn placeholder() -> Self {
        Self::new(Sender::Mentee, String::new(), MessageStatus::Pending)
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage_id = Some(stage);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    pub fn is_failed(&self) -> bool {
        self.status == MessageStatus::Failed
    }
}
