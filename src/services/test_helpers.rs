//! Scripted model and session factory shared by service and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::llm::LlmChat;
use crate::llm::types::{ChatResponse, GenerationConfig, LlmError, Message};
use crate::services::assistant::{ChatSession, GeminiSession, SessionFactory};

// =========================================================================
// MockLlm
// =========================================================================

/// Scripted model: pops one result per call and records what it was sent.
pub struct MockLlm {
    responses: Mutex<Vec<Result<ChatResponse, LlmError>>>,
    pub seen: Mutex<Vec<Vec<Message>>>,
    pub systems: Mutex<Vec<String>>,
}

impl MockLlm {
    pub fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self { responses: Mutex::new(responses), seen: Mutex::new(Vec::new()), systems: Mutex::new(Vec::new()) }
    }
}

pub fn text_response(text: &str) -> ChatResponse {
    ChatResponse {
        text: Some(text.into()),
        model: "mock".into(),
        finish_reason: Some("STOP".into()),
        input_tokens: 0,
        output_tokens: 0,
    }
}

pub fn empty_response() -> ChatResponse {
    ChatResponse { text: None, ..text_response("") }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn generate(
        &self,
        system: &str,
        _config: &GenerationConfig,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.systems.lock().unwrap().push(system.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() { Ok(text_response("done")) } else { responses.remove(0) }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

// =========================================================================
// MockFactory
// =========================================================================

/// Factory that fails `failures` times, then hands out sessions over `llm`.
pub struct MockFactory {
    llm: Arc<MockLlm>,
    failures: AtomicUsize,
    pub builds: Arc<AtomicUsize>,
}

impl MockFactory {
    pub fn new(llm: Arc<MockLlm>, failures: usize) -> Self {
        Self { llm, failures: AtomicUsize::new(failures), builds: Arc::new(AtomicUsize::new(0)) }
    }
}

impl SessionFactory for MockFactory {
    fn create_session(&self, system_instruction: &str) -> Result<Box<dyn ChatSession>, LlmError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(LlmError::MissingApiKey { var: "API_KEY".into() });
        }
        Ok(Box::new(GeminiSession::new(self.llm.clone(), system_instruction, GenerationConfig::default())))
    }
}

