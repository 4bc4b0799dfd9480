use super::*;
use crate::services::test_helpers::{MockFactory, MockLlm, empty_response, text_response};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::Ordering;

fn shared_env() -> (Arc<Mutex<HashMap<String, String>>>, GeminiSessionFactory) {
    let vars: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(HashMap::new()));
    let lookup_vars = vars.clone();
    let factory = GeminiSessionFactory::with_lookup(move |key| lookup_vars.lock().unwrap().get(key).cloned());
    (vars, factory)
}

// =========================================================================
// GeminiSession
// =========================================================================

#[tokio::test]
async fn session_replays_history_and_sends_only_new_message_last() {
    let llm = Arc::new(MockLlm::new(vec![Ok(text_response("first")), Ok(text_response("second"))]));
    let mut session = GeminiSession::new(llm.clone(), "sys", GenerationConfig::default());

    session.send_message("q1").await.unwrap();
    session.send_message("q2").await.unwrap();

    let seen = llm.seen.lock().unwrap();
    assert_eq!(seen[0], vec![Message::user("q1")]);
    assert_eq!(seen[1], vec![Message::user("q1"), Message::model("first"), Message::user("q2")]);
    assert_eq!(session.history().len(), 4);
    assert!(llm.systems.lock().unwrap().iter().all(|s| s == "sys"));
}

#[tokio::test]
async fn session_failure_leaves_history_untouched() {
    let llm = Arc::new(MockLlm::new(vec![
        Ok(text_response("first")),
        Err(LlmError::ApiRequest("connection reset".into())),
    ]));
    let mut session = GeminiSession::new(llm, "sys", GenerationConfig::default());

    session.send_message("q1").await.unwrap();
    assert!(session.send_message("q2").await.is_err());
    assert_eq!(session.history(), &[Message::user("q1"), Message::model("first")]);
}

#[tokio::test]
async fn session_empty_reply_is_not_recorded() {
    let llm = Arc::new(MockLlm::new(vec![Ok(empty_response())]));
    let mut session = GeminiSession::new(llm, "sys", GenerationConfig::default());
    let resp = session.send_message("q1").await.unwrap();
    assert!(resp.text.is_none());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn session_blank_text_reply_is_not_recorded() {
    let llm = Arc::new(MockLlm::new(vec![Ok(text_response(""))]));
    let mut session = GeminiSession::new(llm, "sys", GenerationConfig::default());
    session.send_message("q1").await.unwrap();
    assert!(session.history().is_empty());
}

// =========================================================================
// AssistantAdapter: state machine
// =========================================================================

#[test]
fn adapter_starts_uninitialized() {
    let adapter = AssistantAdapter::new(MockFactory::new(Arc::new(MockLlm::new(vec![])), 0));
    assert_eq!(adapter.status(), SessionStatus::Uninitialized);
}

#[test]
fn ensure_session_builds_once() {
    let factory = MockFactory::new(Arc::new(MockLlm::new(vec![])), 0);
    let builds = factory.builds.clone();
    let mut adapter = AssistantAdapter::new(factory);

    assert!(adapter.ensure_session());
    assert!(adapter.ensure_session());
    assert_eq!(adapter.status(), SessionStatus::Ready);
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn unavailable_retries_on_every_call_then_recovers() {
    let factory = MockFactory::new(Arc::new(MockLlm::new(vec![])), 2);
    let builds = factory.builds.clone();
    let mut adapter = AssistantAdapter::new(factory);

    assert!(!adapter.ensure_session());
    assert!(matches!(adapter.status(), SessionStatus::Unavailable { .. }));
    assert!(!adapter.ensure_session());
    assert!(adapter.ensure_session());
    assert_eq!(adapter.status(), SessionStatus::Ready);
    assert_eq!(builds.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn missing_credential_then_credential_supplied_recovers_without_reset() {
    let (vars, factory) = shared_env();
    let mut adapter = AssistantAdapter::new(factory);

    let err = adapter.send("hello").await.unwrap_err();
    assert!(matches!(err, AssistantError::Unavailable(ref reason) if reason.contains("API Key is missing")));
    assert!(matches!(adapter.status(), SessionStatus::Unavailable { .. }));

    vars.lock().unwrap().insert("API_KEY".into(), "now-set".into());
    assert!(adapter.ensure_session());
    assert_eq!(adapter.status(), SessionStatus::Ready);
}

#[tokio::test]
async fn factory_passes_fixed_system_instruction() {
    let llm = Arc::new(MockLlm::new(vec![]));
    let mut adapter = AssistantAdapter::new(MockFactory::new(llm.clone(), 0));
    assert!(adapter.ensure_session());

    adapter.send("hi").await.unwrap();
    assert_eq!(llm.systems.lock().unwrap()[0], SYSTEM_INSTRUCTION);
}

// =========================================================================
// AssistantAdapter: send
// =========================================================================

#[tokio::test]
async fn send_returns_reply_text() {
    let llm = Arc::new(MockLlm::new(vec![Ok(text_response("=SUM(A:A)"))]));
    let mut adapter = AssistantAdapter::new(MockFactory::new(llm, 0));
    assert_eq!(adapter.send("sum column A").await.unwrap(), "=SUM(A:A)");
    assert_eq!(adapter.status(), SessionStatus::Ready);
}

#[tokio::test]
async fn send_empty_reply_uses_fallback() {
    let llm = Arc::new(MockLlm::new(vec![Ok(empty_response()), Ok(text_response(""))]));
    let mut adapter = AssistantAdapter::new(MockFactory::new(llm, 0));
    assert_eq!(adapter.send("hi").await.unwrap(), EMPTY_REPLY_FALLBACK);
    assert_eq!(adapter.send("hi again").await.unwrap(), EMPTY_REPLY_FALLBACK);
}

#[tokio::test]
async fn send_whitespace_reply_is_returned_and_recorded() {
    let llm = Arc::new(MockLlm::new(vec![Ok(text_response("  ")), Ok(text_response("next"))]));
    let mut adapter = AssistantAdapter::new(MockFactory::new(llm.clone(), 0));

    assert_eq!(adapter.send("hi").await.unwrap(), "  ");
    adapter.send("again").await.unwrap();

    let seen = llm.seen.lock().unwrap();
    assert_eq!(seen[1], vec![Message::user("hi"), Message::model("  "), Message::user("again")]);
}

#[tokio::test]
async fn send_request_failure_keeps_session() {
    let llm = Arc::new(MockLlm::new(vec![
        Err(LlmError::ApiResponse { status: 429, message: "RESOURCE_EXHAUSTED: quota".into() }),
        Ok(text_response("back")),
    ]));
    let factory = MockFactory::new(llm.clone(), 0);
    let builds = factory.builds.clone();
    let mut adapter = AssistantAdapter::new(factory);

    let err = adapter.send("q1").await.unwrap_err();
    assert!(matches!(err, AssistantError::RequestFailed(ref m) if m.contains("quota")));
    assert_eq!(adapter.status(), SessionStatus::Ready);

    assert_eq!(adapter.send("q2").await.unwrap(), "back");
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    // The failed exchange never reached the session history.
    assert_eq!(llm.seen.lock().unwrap()[1], vec![Message::user("q2")]);
}

#[tokio::test]
async fn send_network_failure_is_request_failed() {
    let llm = Arc::new(MockLlm::new(vec![Err(LlmError::ApiRequest("dns error".into()))]));
    let mut adapter = AssistantAdapter::new(MockFactory::new(llm, 0));
    let err = adapter.send("q").await.unwrap_err();
    assert_eq!(err, AssistantError::RequestFailed("API request failed: dns error".into()));
}

#[test]
fn assistant_error_codes() {
    use crate::error::ErrorCode;
    assert_eq!(AssistantError::Unavailable(String::new()).error_code(), "E_ASSISTANT_UNAVAILABLE");
    assert_eq!(AssistantError::RequestFailed(String::new()).error_code(), "E_ASSISTANT_REQUEST_FAILED");
    assert!(AssistantError::Unavailable(String::new()).retryable());
}

#[test]
fn status_serializes_with_state_tag() {
    let json = serde_json::to_value(SessionStatus::Unavailable { reason: "no key".into() }).unwrap();
    assert_eq!(json, serde_json::json!({ "state": "unavailable", "reason": "no key" }));
    let json = serde_json::to_value(SessionStatus::Ready).unwrap();
    assert_eq!(json, serde_json::json!({ "state": "ready" }));
}
