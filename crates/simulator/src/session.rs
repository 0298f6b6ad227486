//! A rehearsal session shared between the presentation layer and in-flight
//! requests.
//!
//! `TrainerSession` owns the conversation state, lifecycle phase and case
//! behind a mutex that is never held across an `.await`. One request may be
//! outstanding at a time (see [`RequestGuard`]). Every request remembers the
//! session generation it was issued under; [`TrainerSession::reset`] bumps the
//! generation, so replies to requests from before the reset are dropped.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use trainer_api::{SubmissionRecord, TrainerBackend};
use trainer_core::{
    ConversationState, Sender, SessionCase, SessionPhase, Stage, Submission, SubmissionPayload,
};
use uuid::Uuid;

use events::{Event, EventBus, EventEnvelope};

use crate::case_generator::{validate_expertise, SessionCaseGenerator};
use crate::conversation::{validate_content, ConversationOrchestrator, ExchangeReport};
use crate::error::{Result, SimulatorError};
use crate::resources::RequestGuard;
use crate::stage_policy::StageProgressionPolicy;
use crate::state_machine::SessionStateMachine;
use crate::submission::SubmissionAssembler;

/// Result of an operation whose response may arrive after a reset.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The response was applied to the session.
    Applied(T),
    /// The session was reset while the request was outstanding; the response
    /// was dropped without touching state.
    Stale,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Stale => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// A submission the backend accepted.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub submission: Submission,
    pub record: SubmissionRecord,
}

#[derive(Debug, Default)]
struct SessionInner {
    state: ConversationState,
    phase: SessionPhase,
    case: Option<SessionCase>,
    generation: u64,
}

pub struct TrainerSession<B> {
    id: Uuid,
    backend: Arc<B>,
    generator: SessionCaseGenerator<B>,
    orchestrator: ConversationOrchestrator<B>,
    inner: Mutex<SessionInner>,
    busy: AtomicBool,
    events: Option<EventBus>,
}

impl<B: TrainerBackend> TrainerSession<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            id: Uuid::new_v4(),
            generator: SessionCaseGenerator::new(backend.clone()),
            orchestrator: ConversationOrchestrator::new(backend.clone()),
            backend,
            inner: Mutex::new(SessionInner::default()),
            busy: AtomicBool::new(false),
            events: None,
        }
    }

    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn with_policy(mut self, policy: StageProgressionPolicy) -> Self {
        self.orchestrator = ConversationOrchestrator::with_policy(self.backend.clone(), policy);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner().phase
    }

    pub fn snapshot(&self) -> ConversationState {
        self.inner().state.clone()
    }

    pub fn case(&self) -> Option<SessionCase> {
        self.inner().case.clone()
    }

    pub fn current_stage(&self) -> Stage {
        self.inner().state.current_stage()
    }

    pub fn generation(&self) -> u64 {
        self.inner().generation
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(std::sync::atomic::Ordering::Acquire)
    }

    pub fn events(&self) -> Option<&EventBus> {
        self.events.as_ref()
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<EventEnvelope>> {
        self.events.as_ref().map(EventBus::subscribe)
    }

    /// Generate the case and open the conversation with it.
    pub async fn generate_case(&self, expertise_text: &str) -> Result<Outcome<SessionCase>> {
        let expertise = validate_expertise(expertise_text)?;
        let _guard = self.acquire()?;

        let generation = {
            let mut inner = self.inner();
            SessionStateMachine::validate_transition(&inner.phase, &SessionPhase::CaseGenerating)?;
            inner.phase = SessionPhase::CaseGenerating;
            inner.generation
        };
        self.emit(Event::CaseRequested {
            session_id: self.id,
        });

        let result = self.generator.generate(expertise).await;

        let mut inner = self.inner();
        if inner.generation != generation {
            drop(inner);
            self.discard(generation);
            return Ok(Outcome::Stale);
        }

        let case = match result {
            Ok(case) => case,
            Err(e) => {
                inner.phase = SessionPhase::NotStarted;
                warn!(session_id = %self.id, error = %e, "Case generation failed");
                return Err(e);
            }
        };

        let message_id = inner.state.start_with_case(&case)?;
        inner.phase = SessionPhase::Active(Stage::ClarifyGoal);
        inner.case = Some(case.clone());
        drop(inner);

        info!(session_id = %self.id, "Session started");
        self.emit(Event::MessageAppended {
            session_id: self.id,
            message_id,
            sender: Sender::Mentee,
        });
        self.emit(Event::CaseGenerated {
            session_id: self.id,
            message_id,
        });

        Ok(Outcome::Applied(case))
    }

    /// Send a mentor message and wait for the mentee's reply.
    ///
    /// A failed request leaves the mentor message and an empty, failed
    /// placeholder in the log; sending again is the retry.
    pub async fn send_message(&self, content: &str) -> Result<Outcome<ExchangeReport>> {
        validate_content(content)?;
        let _guard = self.acquire()?;

        let (exchange, generation) = {
            let mut inner = self.inner();
            match inner.phase {
                SessionPhase::Active(_) => {}
                SessionPhase::NotStarted | SessionPhase::CaseGenerating => {
                    return Err(SimulatorError::NotStarted)
                }
                phase => return Err(SimulatorError::NotActive(phase)),
            }
            let exchange = self.orchestrator.begin_exchange(&mut inner.state, content)?;
            (exchange, inner.generation)
        };

        for (message_id, sender) in [
            (exchange.mentor_message_id, Sender::Mentor),
            (exchange.placeholder_id, Sender::Mentee),
        ] {
            self.emit(Event::MessageAppended {
                session_id: self.id,
                message_id,
                sender,
            });
        }

        let reply = self.orchestrator.request_reply(&exchange).await;

        let mut inner = self.inner();
        if inner.generation != generation {
            drop(inner);
            self.discard(generation);
            return Ok(Outcome::Stale);
        }

        let result = self
            .orchestrator
            .finish_exchange(&mut inner.state, &exchange, reply);

        match result {
            Ok(report) => {
                if report.advanced() {
                    let next = SessionPhase::Active(report.stage);
                    debug_assert!(SessionStateMachine::can_transition(&inner.phase, &next));
                    inner.phase = next;
                }
                drop(inner);

                self.emit(Event::ReplyResolved {
                    session_id: self.id,
                    message_id: report.reply.id,
                });
                if let Some(from) = report.advanced_from {
                    self.emit(Event::StageAdvanced {
                        session_id: self.id,
                        from,
                        to: report.stage,
                    });
                }
                Ok(Outcome::Applied(report))
            }
            Err(e) => {
                drop(inner);
                self.emit(Event::ReplyFailed {
                    session_id: self.id,
                    message_id: exchange.placeholder_id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Assemble the submission, deliver it, and close the session.
    ///
    /// The session stays active when delivery fails.
    pub async fn complete(&self, mentor_notes: &str) -> Result<Outcome<CompletedSession>> {
        let _guard = self.acquire()?;

        let (submission, generation) = {
            let inner = self.inner();
            let submission =
                SubmissionAssembler::build(&inner.state, inner.case.as_ref(), mentor_notes)?;
            SessionStateMachine::validate_transition(&inner.phase, &SessionPhase::Completed)?;
            (submission, inner.generation)
        };

        let payload = SubmissionPayload::from(submission.clone());
        let record = self.backend.submit(&payload).await.map_err(|e| {
            warn!(session_id = %self.id, error = %e, "Submission failed");
            SimulatorError::Service(e)
        })?;

        let mut inner = self.inner();
        if inner.generation != generation {
            drop(inner);
            self.discard(generation);
            return Ok(Outcome::Stale);
        }
        inner.phase = SessionPhase::Completed;
        drop(inner);

        info!(
            session_id = %self.id,
            completed_stages = submission.completed_stages(),
            "Session completed"
        );
        self.emit(Event::SessionCompleted {
            session_id: self.id,
            completed_stages: submission.completed_stages(),
        });

        Ok(Outcome::Applied(CompletedSession { submission, record }))
    }

    /// Return to the initial state and orphan any outstanding request.
    ///
    /// The transport is not aborted: the busy flag stays set until the
    /// orphaned request returns, keeping requests to the backend ordered.
    pub fn reset(&self) -> u64 {
        let generation = {
            let mut inner = self.inner();
            inner.generation += 1;
            inner.state.reset();
            inner.phase = SessionPhase::NotStarted;
            inner.case = None;
            inner.generation
        };

        info!(session_id = %self.id, generation, "Session reset");
        self.emit(Event::SessionReset {
            session_id: self.id,
            generation,
        });
        generation
    }

    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) -> Result<RequestGuard<'_>> {
        RequestGuard::acquire(&self.busy, self.id, self.events.as_ref())
            .ok_or(SimulatorError::RequestInFlight(self.id))
    }

    fn discard(&self, generation: u64) {
        debug!(session_id = %self.id, generation, "Discarding response for reset session");
        self.emit(Event::StaleResponseDiscarded {
            session_id: self.id,
            generation,
        });
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.events {
            bus.emit(event);
        }
    }
}
