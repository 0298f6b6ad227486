//! The request / placeholder / replace loop against the generation service.
//!
//! An exchange is split in three steps so a shared session can release its
//! lock while the request is outstanding:
//!
//! 1. [`ConversationOrchestrator::begin_exchange`] appends the mentor message
//!    and an empty mentee placeholder, and captures the history to send.
//! 2. [`ConversationOrchestrator::request_reply`] talks to the backend.
//! 3. [`ConversationOrchestrator::finish_exchange`] writes the reply into the
//!    placeholder (or marks it failed) and applies the stage policy.
//!
//! [`ConversationOrchestrator::send_message`] runs all three against a state
//! the caller owns exclusively.

use std::sync::Arc;

use tracing::{debug, info, warn};
use trainer_api::{ApiError, TrainerBackend};
use trainer_core::{ConversationState, Message, Stage};
use uuid::Uuid;

use crate::error::{Result, SimulatorError};
use crate::stage_policy::StageProgressionPolicy;

/// A mentor message that has been logged and is waiting for its reply.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub mentor_message_id: Uuid,
    pub placeholder_id: Uuid,
    pub content: String,
    /// Resolved messages preceding this exchange.
    pub history: Vec<Message>,
}

/// What a successful exchange did to the conversation.
#[derive(Debug, Clone)]
pub struct ExchangeReport {
    pub mentor_message_id: Uuid,
    pub reply: Message,
    pub stage: Stage,
    /// The stage left behind, when the exchange moved the conversation on.
    pub advanced_from: Option<Stage>,
}

impl ExchangeReport {
    pub fn advanced(&self) -> bool {
        self.advanced_from.is_some()
    }
}

pub fn validate_content(content: &str) -> Result<&str> {
    if content.trim().is_empty() {
        return Err(SimulatorError::Validation("message is empty".to_string()));
    }
    Ok(content)
}

pub struct ConversationOrchestrator<B> {
    backend: Arc<B>,
    policy: StageProgressionPolicy,
}

impl<B: TrainerBackend> ConversationOrchestrator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_policy(backend, StageProgressionPolicy::default())
    }

    pub fn with_policy(backend: Arc<B>, policy: StageProgressionPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &StageProgressionPolicy {
        &self.policy
    }

    pub fn begin_exchange(
        &self,
        state: &mut ConversationState,
        content: &str,
    ) -> Result<PendingExchange> {
        let content = validate_content(content)?;
        if !state.session_started() {
            return Err(SimulatorError::NotStarted);
        }

        let history: Vec<Message> = state
            .messages()
            .iter()
            .filter(|m| !m.is_pending() && !m.is_failed())
            .cloned()
            .collect();

        let stage = state.current_stage();
        let mentor_message_id = state.append(Message::mentor(content).with_stage(stage));
        let placeholder_id = state.append(Message::placeholder().with_stage(stage));

        debug!(
            mentor_message_id = %mentor_message_id,
            placeholder_id = %placeholder_id,
            history = history.len(),
            "Exchange started"
        );

        Ok(PendingExchange {
            mentor_message_id,
            placeholder_id,
            content: content.to_string(),
            history,
        })
    }

    pub async fn request_reply(
        &self,
        exchange: &PendingExchange,
    ) -> std::result::Result<String, ApiError> {
        self.backend.chat(&exchange.content, &exchange.history).await
    }

    /// Apply the outcome of [`Self::request_reply`].
    ///
    /// On failure the mentor message stays and the placeholder is left empty
    /// and marked failed; the stage does not move.
    pub fn finish_exchange(
        &self,
        state: &mut ConversationState,
        exchange: &PendingExchange,
        reply: std::result::Result<String, ApiError>,
    ) -> Result<ExchangeReport> {
        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    placeholder_id = %exchange.placeholder_id,
                    error = %e,
                    "Mentee reply failed"
                );
                state.fail_placeholder(exchange.placeholder_id)?;
                return Err(SimulatorError::Service(e));
            }
        };

        let reply = state
            .resolve_placeholder(exchange.placeholder_id, reply)?
            .clone();

        let before = state.current_stage();
        let next = self
            .policy
            .next_stage(state.message_count(), state.current_stage_index());
        let advanced_from = state.advance_to(next).map(|to| {
            info!(from = %before, to = %to, messages = state.message_count(), "Stage advanced");
            before
        });

        Ok(ExchangeReport {
            mentor_message_id: exchange.mentor_message_id,
            reply,
            stage: state.current_stage(),
            advanced_from,
        })
    }

    /// Run a whole exchange against a state owned by the caller.
    pub async fn send_message(
        &self,
        state: &mut ConversationState,
        content: &str,
    ) -> Result<ExchangeReport> {
        let exchange = self.begin_exchange(state, content)?;
        let reply = self.request_reply(&exchange).await;
        self.finish_exchange(state, &exchange, reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::ScriptedBackend;
    use trainer_core::{MessageStatus, Sender, SessionCase};

    fn started_state() -> ConversationState {
        let mut state = ConversationState::new();
        state
            .start_with_case(&SessionCase::new("product management", "Meet Jordan."))
            .unwrap();
        state
    }

    fn orchestrator() -> (Arc<ScriptedBackend>, ConversationOrchestrator<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new());
        (backend.clone(), ConversationOrchestrator::new(backend))
    }

    #[tokio::test]
    async fn test_exchange_appends_and_resolves() {
        let (backend, orchestrator) = orchestrator();
        backend.push_reply(Ok("I want to lead better meetings.".to_string()));
        let mut state = started_state();

        let report = orchestrator
            .send_message(&mut state, "What brings you here?")
            .await
            .unwrap();

        let messages = state.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::Mentor);
        assert_eq!(messages[1].content, "What brings you here?");
        assert_eq!(messages[1].stage_id, Some(Stage::ClarifyGoal));
        assert_eq!(messages[2].id, report.reply.id);
        assert_eq!(messages[2].content, "I want to lead better meetings.");
        assert_eq!(messages[2].status, MessageStatus::Final);
        assert!(!report.advanced());
    }

    #[tokio::test]
    async fn test_history_sent_without_current_exchange() {
        let (backend, orchestrator) = orchestrator();
        let mut state = started_state();

        orchestrator.send_message(&mut state, "first").await.unwrap();
        orchestrator.send_message(&mut state, "second").await.unwrap();

        let requests = backend.chat_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, "first");
        assert_eq!(requests[0].1.len(), 1);
        assert_eq!(requests[1].0, "second");
        assert_eq!(requests[1].1.len(), 3);
        assert!(requests[1].1.iter().all(|m| !m.content.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_content_rejected_without_request() {
        let (backend, orchestrator) = orchestrator();
        let mut state = started_state();

        let err = orchestrator.send_message(&mut state, "   ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(state.message_count(), 1);
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_not_started_rejected() {
        let (backend, orchestrator) = orchestrator();
        let mut state = ConversationState::new();

        let err = orchestrator.send_message(&mut state, "hello").await.unwrap_err();

        assert!(matches!(err, SimulatorError::NotStarted));
        assert!(state.messages().is_empty());
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_mentor_message_and_placeholder() {
        let (backend, orchestrator) = orchestrator();
        backend.push_reply(Err(ScriptedBackend::service_error(502)));
        let mut state = started_state();
        state.append(Message::mentor("earlier"));
        state.append(Message::mentee("earlier reply"));

        let err = orchestrator.send_message(&mut state, "still there?").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Service);
        let messages = state.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3].content, "still there?");
        assert!(messages[4].content.is_empty());
        assert!(messages[4].is_failed());
        assert_eq!(state.current_stage_index(), 0);
    }

    #[tokio::test]
    async fn test_failed_placeholder_not_sent_as_history() {
        let (backend, orchestrator) = orchestrator();
        backend.push_reply(Err(ScriptedBackend::service_error(500)));
        let mut state = started_state();

        let _ = orchestrator.send_message(&mut state, "try one").await;
        orchestrator.send_message(&mut state, "try two").await.unwrap();

        let requests = backend.chat_requests();
        let history = &requests[1].1;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "try one");
    }

    #[tokio::test]
    async fn test_stage_advances_after_exchange() {
        let (_backend, orchestrator) = orchestrator();
        let mut state = started_state();

        let first = orchestrator.send_message(&mut state, "one").await.unwrap();
        assert_eq!(state.message_count(), 3);
        assert!(!first.advanced());

        let second = orchestrator.send_message(&mut state, "two").await.unwrap();
        assert_eq!(state.message_count(), 5);
        assert_eq!(second.advanced_from, Some(Stage::ClarifyGoal));
        assert_eq!(second.stage, Stage::SolutionSearch);
        assert_eq!(state.current_stage_index(), 1);
    }
}
