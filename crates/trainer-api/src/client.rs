use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use trainer_core::{Message, SubmissionPayload};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::types::{ChatRequest, ErrorBody, GenerateCaseRequest, GenerationResponse, SubmissionRecord};

const GENERATE_CASE_ENDPOINT: &str = "ai-session-trainer-generate-case";
const CHAT_ENDPOINT: &str = "ai-session-trainer-chat";

/// HTTP client for the course backend's session-trainer endpoints.
pub struct TrainerClient {
    config: ClientConfig,
    client: Client,
}

impl TrainerClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(ApiError::Config(format!("missing {}", missing.join(", "))));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            config,
            client: builder.build()?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/courses/{}/assignments/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.course_id,
            self.config.assignment_id,
            suffix
        )
    }

    pub async fn generate_case(&self, expertise: &str) -> Result<String> {
        debug!(chars = expertise.len(), "Requesting session case");

        let request = GenerateCaseRequest {
            expertise: expertise.to_string(),
        };
        let body: GenerationResponse = self
            .post(&self.endpoint(GENERATE_CASE_ENDPOINT), &request)
            .await?;

        Ok(body.response)
    }

    pub async fn chat(&self, message: &str, history: &[Message]) -> Result<String> {
        debug!(history = history.len(), "Requesting mentee reply");

        let request = ChatRequest {
            message,
            conversation_history: history,
        };
        let body: GenerationResponse = self.post(&self.endpoint(CHAT_ENDPOINT), &request).await?;

        Ok(body.response)
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionRecord> {
        let kind = payload.kind();
        let url = self.endpoint(kind.submit_endpoint());
        debug!(kind = kind.as_str(), "Submitting assignment");

        match payload {
            // The session trainer endpoint takes the bare submission object.
            SubmissionPayload::AiSessionTrainer(submission) => self.post(&url, submission).await,
            other => self.post(&url, other).await,
        }
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(url).json(body);
        if !self.config.token.is_empty() {
            request = request.bearer_auth(&self.config.token);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()));

            warn!(status = status.as_u16(), message = ?message, "Backend rejected request");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", e, truncate(&text, 200))))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
