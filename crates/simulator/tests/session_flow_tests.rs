use std::sync::Arc;

use serde_json::json;
use simulator::{ErrorKind, SimulatorError, TrainerSession};
use trainer_api::{ClientConfig, TrainerClient};
use trainer_core::{MessageStatus, Sender, SessionPhase, Stage};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "/courses/course-7/assignments/assign-3";

async fn setup() -> (MockServer, TrainerSession<TrainerClient>) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(server.uri(), "course-7", "assign-3").with_token("token");
    let client = TrainerClient::new(config).expect("client");
    (server, TrainerSession::new(Arc::new(client)))
}

async fn mount_case(server: &MockServer, scenario: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/ai-session-trainer-generate-case")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": scenario })))
        .mount(server)
        .await;
}

async fn mount_chat(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/ai-session-trainer-chat")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": reply })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_case_opens_conversation() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{BASE}/ai-session-trainer-generate-case")))
        .and(body_partial_json(json!({ "expertise": "product management" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "Meet Dana, a new PM who cannot say no." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    session.generate_case("product management").await.unwrap();

    let state = session.snapshot();
    assert_eq!(state.message_count(), 1);
    let opening = &state.messages()[0];
    assert_eq!(opening.sender, Sender::Mentee);
    assert_eq!(opening.content, "Meet Dana, a new PM who cannot say no.");
    assert_eq!(opening.stage_id, Some(Stage::ClarifyGoal));
    assert!(state.session_started());
    assert!(state.case_generated());
    assert_eq!(state.current_stage_index(), 0);
}

#[tokio::test]
async fn test_stages_advance_with_message_count() {
    let (server, session) = setup().await;
    mount_case(&server, "Meet Dana.").await;
    mount_chat(&server, "I see what you mean.").await;
    session.generate_case("product management").await.unwrap();

    let mut stages = Vec::new();
    for question in [
        "What would you like to work on?",
        "What have you tried so far?",
        "Which option feels right?",
        "What will you do this week?",
    ] {
        session.send_message(question).await.unwrap();
        stages.push(session.snapshot().current_stage_index());
    }

    assert_eq!(stages, vec![0, 1, 1, 2]);
    assert_eq!(session.snapshot().message_count(), 9);
    assert_eq!(session.phase(), SessionPhase::Active(Stage::WrapUp));
}

#[tokio::test]
async fn test_history_excludes_current_exchange() {
    let (server, session) = setup().await;
    mount_case(&server, "Meet Dana.").await;
    session.generate_case("product management").await.unwrap();

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/ai-session-trainer-chat")))
        .and(body_partial_json(json!({
            "message": "How are you?",
            "conversationHistory": [{ "sender": "mentee", "content": "Meet Dana." }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Tired." })))
        .expect(1)
        .mount(&server)
        .await;

    let report = session.send_message("How are you?").await.unwrap().applied().unwrap();
    assert_eq!(report.reply.content, "Tired.");
}

#[tokio::test]
async fn test_complete_posts_submission() {
    let (server, session) = setup().await;
    mount_case(&server, "Meet Dana.").await;
    mount_chat(&server, "Okay.").await;
    session.generate_case("product management").await.unwrap();
    session.send_message("one").await.unwrap();
    session.send_message("two").await.unwrap();
    assert_eq!(session.snapshot().current_stage_index(), 1);

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/ai-session-trainer-submit")))
        .and(body_partial_json(json!({
            "sessionSummary": "Meet Dana.",
            "mentorNotes": "good session",
            "expertise": "product management",
            "completedStages": 2,
            "totalStages": 3
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 42, "status": "submitted" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let completed = session
        .complete("good session")
        .await
        .unwrap()
        .applied()
        .unwrap();

    assert_eq!(completed.submission.conversation_data().len(), 5);
    assert_eq!(completed.record.id_string().as_deref(), Some("42"));
    assert_eq!(session.phase(), SessionPhase::Completed);
}

#[tokio::test]
async fn test_complete_accepts_unusual_record() {
    let (server, session) = setup().await;
    mount_case(&server, "Meet Dana.").await;
    session.generate_case("product management").await.unwrap();

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/ai-session-trainer-submit")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "status": "pending",
            "createdAt": "2024-05-01 10:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completed = session.complete("notes").await.unwrap().applied().unwrap();

    assert_eq!(completed.record.id_string().as_deref(), Some("1"));
    assert_eq!(session.phase(), SessionPhase::Completed);
}

#[tokio::test]
async fn test_failed_reply_leaves_failed_placeholder() {
    let (server, session) = setup().await;
    mount_case(&server, "Meet Dana.").await;
    session.generate_case("product management").await.unwrap();

    Mock::given(method("POST"))
        .and(path(format!("{BASE}/ai-session-trainer-chat")))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({ "message": "upstream down" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let err = session.send_message("Hello?").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
    assert!(err.is_retryable());
    assert!(err.to_string().contains("upstream down"));

    let state = session.snapshot();
    assert_eq!(state.message_count(), 3);
    assert_eq!(state.messages()[1].sender, Sender::Mentor);
    assert_eq!(state.messages()[1].content, "Hello?");
    assert!(state.messages()[2].content.is_empty());
    assert_eq!(state.messages()[2].status, MessageStatus::Failed);
    assert!(!session.is_busy());

    // retry goes through once the service recovers
    mount_chat(&server, "Sorry, I am here.").await;
    session.send_message("Hello?").await.unwrap();
    assert_eq!(session.snapshot().message_count(), 5);
}

#[tokio::test]
async fn test_validation_sends_nothing() {
    let (server, session) = setup().await;

    let err = session.generate_case("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = session.send_message("hi").await.unwrap_err();
    assert!(matches!(err, SimulatorError::NotStarted));

    let err = session.complete("notes").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_reset_then_restart() {
    let (server, session) = setup().await;
    mount_case(&server, "Meet Dana.").await;
    mount_chat(&server, "Okay.").await;
    session.generate_case("product management").await.unwrap();
    session.send_message("one").await.unwrap();

    session.reset();
    assert!(session.snapshot().messages().is_empty());
    assert_eq!(session.phase(), SessionPhase::NotStarted);

    session.generate_case("sales").await.unwrap();
    assert_eq!(session.case().unwrap().expertise_text(), "sales");
    assert_eq!(session.snapshot().message_count(), 1);
}
