use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use trainer_core::Message;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCaseRequest {
    pub expertise: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_history: &'a [Message],
}

/// Body returned by both generation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub response: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// The persisted submission as echoed back by the backend.
///
/// The backend has already stored the submission when this arrives, so no
/// field may fail the decode. Known fields are kept as raw JSON and read
/// through the accessors; everything else lands in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SubmissionRecord {
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref()?.as_str()
    }

    /// Creation time when the backend sent one we can read: RFC 3339, a
    /// naive `YYYY-MM-DD HH:MM:SS[.f]` taken as UTC, or epoch seconds.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self.created_at.as_ref()? {
            serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                        .ok()
                        .map(|naive| naive.and_utc())
                }),
            serde_json::Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
            _ => None,
        }
    }
}
