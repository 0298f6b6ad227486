use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Where the backend lives and which assignment a session belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend API root, without a trailing `/courses`.
    pub base_url: String,

    /// Bearer token. Requests go out unauthenticated when empty.
    #[serde(default)]
    pub token: String,

    pub course_id: String,

    pub assignment_id: String,

    /// Per-request timeout. `None` waits for the transport to give up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
            course_id: String::new(),
            assignment_id: String::new(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        course_id: impl Into<String>,
        assignment_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            course_id: course_id.into(),
            assignment_id: assignment_id.into(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Names of required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.trim().is_empty() {
            missing.push("base_url");
        }
        if self.course_id.trim().is_empty() {
            missing.push("course_id");
        }
        if self.assignment_id.trim().is_empty() {
            missing.push("assignment_id");
        }
        missing
    }
}
