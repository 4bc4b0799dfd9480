//! Assistant service: one lazily created chat session with the model.
//!
//! DESIGN
//! ======
//! The adapter owns an explicit [`SessionState`]. A session is only built
//! when something needs it (`ensure_session` or the first `send`). A failed
//! build parks the adapter in `Unavailable`, which is never sticky: the next
//! call builds again from scratch, so supplying the credential later is
//! enough to recover without a restart.
//!
//! The session owns its turn history. Callers hand the adapter only the new
//! message; the session replays the history to the stateless model API.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::llm::config::LlmConfig;
use crate::llm::types::{ChatResponse, GenerationConfig, LlmError, Message};
use crate::llm::{LlmChat, LlmClient};

pub const SYSTEM_INSTRUCTION: &str = "\
You are SheetMaster AI, an expert Google Sheets consultant helping a user who is working inside a Google Sheet.
You cannot see the sheet content (the editor is embedded cross-origin), but you can answer questions about:
1. Formulas (SUM, VLOOKUP, INDEX/MATCH, QUERY, REGEX and friends).
2. Google Apps Script helpers.
3. Organizing data and building pivot tables.
4. Troubleshooting errors such as #REF! and #N/A.

When you provide formulas:
- Be concise.
- Briefly explain how the formula works.
- Give copy-pasteable examples.

If the user asks you to analyze their data, ask them to paste the header row or a sample row into the chat first.";

/// Reply text used when the model answers successfully but says nothing.
pub const EMPTY_REPLY_FALLBACK: &str = "I couldn't generate a response.";

/// Error text used when a failed request carries no description.
pub const REQUEST_FAILED_FALLBACK: &str = "An error occurred while communicating with AI.";

const NOT_INITIALIZED: &str = "assistant session not initialized";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssistantError {
    /// The client or session could not be constructed.
    #[error("assistant unavailable: {0}")]
    Unavailable(String),
    /// A constructed session failed to deliver a message.
    #[error("{0}")]
    RequestFailed(String),
}

impl crate::error::ErrorCode for AssistantError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_ASSISTANT_UNAVAILABLE",
            Self::RequestFailed(_) => "E_ASSISTANT_REQUEST_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

// =============================================================================
// SESSION TRAITS
// =============================================================================

/// A stateful conversation with the model.
#[async_trait::async_trait]
pub trait ChatSession: Send {
    /// Send one new user message; prior turns are retained by the session.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`LlmError`] when the exchange fails.
    async fn send_message(&mut self, text: &str) -> Result<ChatResponse, LlmError>;
}

/// Builds clients and sessions. Called again on every retry.
pub trait SessionFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`LlmError`] when configuration or client construction fails.
    fn create_session(&self, system_instruction: &str) -> Result<Box<dyn ChatSession>, LlmError>;
}

// =============================================================================
// GEMINI SESSION
// =============================================================================

/// Session backed by any [`LlmChat`]; keeps completed turns locally and
/// sends the whole conversation on each request.
pub struct GeminiSession {
    llm: Arc<dyn LlmChat>,
    system: String,
    config: GenerationConfig,
    history: Vec<Message>,
}

impl GeminiSession {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, system: impl Into<String>, config: GenerationConfig) -> Self {
        Self { llm, system: system.into(), config, history: Vec::new() }
    }

    /// Completed turns, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

#[async_trait::async_trait]
impl ChatSession for GeminiSession {
    async fn send_message(&mut self, text: &str) -> Result<ChatResponse, LlmError> {
        let mut request = self.history.clone();
        request.push(Message::user(text));

        let response = self
            .llm
            .generate(&self.system, &self.config, &request)
            .await?;

        info!(
            model = %response.model,
            finish_reason = response.finish_reason.as_deref().unwrap_or("-"),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "assistant: model response"
        );

        // Only whole exchanges enter the history; an empty reply leaves it as it was.
        if let Some(reply) = response.text.as_deref().filter(|t| !t.is_empty()) {
            self.history.extend([Message::user(text), Message::model(reply)]);
        }

        Ok(response)
    }
}

/// Production factory: reads [`LlmConfig`] on every construction.
pub struct GeminiSessionFactory {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl GeminiSessionFactory {
    /// Factory reading configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self { lookup: Box::new(lookup) }
    }
}

impl SessionFactory for GeminiSessionFactory {
    fn create_session(&self, system_instruction: &str) -> Result<Box<dyn ChatSession>, LlmError> {
        let config = LlmConfig::from_lookup(&self.lookup)?;
        let client = LlmClient::from_config(&config)?;
        info!(model = client.model(), "assistant: LLM client initialized");
        Ok(Box::new(GeminiSession::new(Arc::new(client), system_instruction, config.generation)))
    }
}

// =============================================================================
// ADAPTER
// =============================================================================

/// Lifecycle of the adapter's session.
pub enum SessionState {
    Uninitialized,
    Ready(Box<dyn ChatSession>),
    Unavailable(String),
}

/// Serializable view of [`SessionState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    Ready,
    Unavailable { reason: String },
}

/// Owns the single process-wide assistant conversation.
pub struct AssistantAdapter {
    factory: Box<dyn SessionFactory>,
    system_instruction: String,
    state: SessionState,
}

impl AssistantAdapter {
    #[must_use]
    pub fn new(factory: impl SessionFactory + 'static) -> Self {
        Self::with_instruction(factory, SYSTEM_INSTRUCTION)
    }

    #[must_use]
    pub fn with_instruction(factory: impl SessionFactory + 'static, system_instruction: impl Into<String>) -> Self {
        Self {
            factory: Box::new(factory),
            system_instruction: system_instruction.into(),
            state: SessionState::Uninitialized,
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match &self.state {
            SessionState::Uninitialized => SessionStatus::Uninitialized,
            SessionState::Ready(_) => SessionStatus::Ready,
            SessionState::Unavailable(reason) => SessionStatus::Unavailable { reason: reason.clone() },
        }
    }

    /// Build the session unless one is already live. Returns `true` when ready.
    pub fn ensure_session(&mut self) -> bool {
        if matches!(self.state, SessionState::Ready(_)) {
            return true;
        }

        match self.factory.create_session(&self.system_instruction) {
            Ok(session) => {
                if matches!(self.state, SessionState::Unavailable(_)) {
                    info!("assistant: session recovered");
                }
                self.state = SessionState::Ready(session);
                true
            }
            Err(e) => {
                warn!(error = %e, "assistant: session unavailable");
                self.state = SessionState::Unavailable(e.to_string());
                false
            }
        }
    }

    /// Send `message` to the model and return its reply text.
    ///
    /// # Errors
    ///
    /// [`AssistantError::Unavailable`] when no session can be built,
    /// [`AssistantError::RequestFailed`] when the exchange itself fails. A
    /// request failure keeps the session for the next call.
    pub async fn send(&mut self, message: &str) -> Result<String, AssistantError> {
        self.ensure_session();

        if let SessionState::Unavailable(reason) = &self.state {
            return Err(AssistantError::Unavailable(reason.clone()));
        }
        let SessionState::Ready(session) = &mut self.state else {
            return Err(AssistantError::Unavailable(NOT_INITIALIZED.into()));
        };

        match session.send_message(message).await {
            Ok(response) => Ok(response
                .text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string())),
            Err(e) => {
                error!(error = %e, "assistant: request failed");
                Err(AssistantError::RequestFailed(describe_failure(&e)))
            }
        }
    }
}

fn describe_failure(err: &LlmError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() { REQUEST_FAILED_FALLBACK.to_string() } else { message }
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
