use std::sync::Arc;

use tracing::{debug, info};
use trainer_api::TrainerBackend;
use trainer_core::SessionCase;

use crate::error::{Result, SimulatorError};

/// Trimmed expertise, or a validation error when nothing is left.
pub fn validate_expertise(expertise_text: &str) -> Result<&str> {
    let trimmed = expertise_text.trim();
    if trimmed.is_empty() {
        return Err(SimulatorError::Validation(
            "expertise description is required".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Turns a mentor's expertise description into a coaching scenario.
///
/// Never touches session state; the caller decides what to do with the case.
pub struct SessionCaseGenerator<B> {
    backend: Arc<B>,
}

impl<B: TrainerBackend> SessionCaseGenerator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn generate(&self, expertise_text: &str) -> Result<SessionCase> {
        let expertise = validate_expertise(expertise_text)?;

        debug!(expertise = %expertise, "Generating session case");
        let scenario = self.backend.generate_case(expertise).await?;
        info!(chars = scenario.len(), "Session case generated");

        Ok(SessionCase::new(expertise, scenario))
    }
}
