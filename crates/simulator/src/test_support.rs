//! In-memory backend used by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use trainer_api::{ApiError, SubmissionRecord, TrainerBackend};
use trainer_core::{Message, SubmissionPayload};

type ApiResult<T> = trainer_api::Result<T>;

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    cases: Mutex<VecDeque<ApiResult<String>>>,
    replies: Mutex<VecDeque<ApiResult<String>>>,
    receipts: Mutex<VecDeque<ApiResult<SubmissionRecord>>>,
    case_requests: Mutex<Vec<String>>,
    chat_requests: Mutex<Vec<(String, Vec<Message>)>>,
    submitted: Mutex<Vec<SubmissionPayload>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits for one `notify_one` on the returned handle.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let backend = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (backend, gate)
    }

    pub fn service_error(status: u16) -> ApiError {
        ApiError::Api {
            status,
            message: Some("scripted failure".to_string()),
        }
    }

    pub fn push_case(&self, result: ApiResult<String>) {
        self.cases.lock().unwrap().push_back(result);
    }

    pub fn push_reply(&self, result: ApiResult<String>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn push_receipt(&self, result: ApiResult<SubmissionRecord>) {
        self.receipts.lock().unwrap().push_back(result);
    }

    pub fn case_requests(&self) -> Vec<String> {
        self.case_requests.lock().unwrap().clone()
    }

    pub fn chat_requests(&self) -> Vec<(String, Vec<Message>)> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<SubmissionPayload> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> usize {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        n
    }
}

#[async_trait]
impl TrainerBackend for ScriptedBackend {
    async fn generate_case(&self, expertise: &str) -> ApiResult<String> {
        self.case_requests.lock().unwrap().push(expertise.to_string());
        self.enter().await;
        self.cases
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Scenario for {expertise}")))
    }

    async fn chat(&self, message: &str, history: &[Message]) -> ApiResult<String> {
        self.chat_requests
            .lock()
            .unwrap()
            .push((message.to_string(), history.to_vec()));
        let n = self.enter().await;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("reply {n}")))
    }

    async fn submit(&self, payload: &SubmissionPayload) -> ApiResult<SubmissionRecord> {
        self.submitted.lock().unwrap().push(payload.clone());
        self.enter().await;
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SubmissionRecord::default()))
    }
}
