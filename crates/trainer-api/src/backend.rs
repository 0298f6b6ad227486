use async_trait::async_trait;
use trainer_core::{Message, SubmissionPayload};

use crate::client::TrainerClient;
use crate::error::Result;
use crate::types::SubmissionRecord;

/// Remote operations a rehearsal session depends on.
#[async_trait]
pub trait TrainerBackend: Send + Sync {
    /// Turn an expertise description into a coaching scenario.
    async fn generate_case(&self, expertise: &str) -> Result<String>;

    /// Produce the mentee's reply to `message` given the prior conversation.
    async fn chat(&self, message: &str, history: &[Message]) -> Result<String>;

    /// Hand a finished assignment to the backend.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionRecord>;
}

#[async_trait]
impl TrainerBackend for TrainerClient {
    async fn generate_case(&self, expertise: &str) -> Result<String> {
        TrainerClient::generate_case(self, expertise).await
    }

    async fn chat(&self, message: &str, history: &[Message]) -> Result<String> {
        TrainerClient::chat(self, message, history).await
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionRecord> {
        TrainerClient::submit(self, payload).await
    }
}
