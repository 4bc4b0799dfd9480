//! Conversation view-model: the chat panel's turn log and loading flag.
//!
//! DESIGN
//! ======
//! The log is append-only. A submit runs in three steps: `begin_submit`
//! under the conversation lock, the assistant round-trip with the lock
//! released, then `finish_submit` under the lock again. The loading flag is
//! the only serialization: a second submit while one is outstanding is
//! dropped, not queued.
//!
//! `loading` is cleared on every exit path. A [`PendingTurn`] guard finishes
//! the turn with an error if the submit future is dropped before the reply
//! arrives.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::assistant::{AssistantAdapter, AssistantError};

pub const WELCOME_TEXT: &str =
    "Hi! I'm your SheetMaster assistant. Ask me for formula help, script ideas, or how to fix spreadsheet errors.";

/// Shown in place of a reply whenever the assistant fails, whatever the cause.
pub const APOLOGY_TEXT: &str =
    "I'm having trouble connecting right now. Please check your internet or try again later.";

/// Conversation shared between request handlers.
pub type SharedConversation = Arc<Mutex<Conversation>>;

// =============================================================================
// TURNS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message in the chat panel. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub role: TurnRole,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub is_error: bool,
}

impl ChatTurn {
    fn new(role: TurnRole, text: impl Into<String>, is_error: bool) -> Self {
        Self { id: Uuid::new_v4(), role, text: text.into(), created_at: OffsetDateTime::now_utc(), is_error }
    }
}

// =============================================================================
// CONVERSATION
// =============================================================================

#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    loading: bool,
}

impl Conversation {
    /// A fresh conversation holding only the welcome turn.
    #[must_use]
    pub fn new() -> Self {
        Self { turns: vec![ChatTurn::new(TurnRole::Assistant, WELCOME_TEXT, false)], loading: false }
    }

    #[must_use]
    pub fn shared() -> SharedConversation {
        Arc::new(Mutex::new(Self::new()))
    }

    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Append a user turn and mark a reply as pending.
    pub fn append_user_turn(&mut self, text: &str) {
        self.turns.push(ChatTurn::new(TurnRole::User, text, false));
        self.loading = true;
    }

    /// Start a submit. Returns the text to send, or `None` when the input is
    /// blank or a reply is already pending.
    pub fn begin_submit(&mut self, text: &str) -> Option<String> {
        if text.trim().is_empty() || self.loading {
            return None;
        }
        self.append_user_turn(text);
        Some(text.to_string())
    }

    /// Append the assistant's reply, or the apology on failure, and clear
    /// the pending flag.
    pub fn finish_submit(&mut self, result: Result<String, AssistantError>) {
        let turn = match result {
            Ok(reply) => ChatTurn::new(TurnRole::Assistant, reply, false),
            Err(e) => {
                warn!(error = %e, "conversation: assistant reply failed");
                ChatTurn::new(TurnRole::Assistant, APOLOGY_TEXT, true)
            }
        };
        self.turns.push(turn);
        self.loading = false;
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn lock(conversation: &Mutex<Conversation>) -> MutexGuard<'_, Conversation> {
    conversation
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// SUBMIT
// =============================================================================

/// Result of [`submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Blank input or a reply already pending; nothing changed.
    Ignored,
    /// Two turns were appended; `is_error` marks the assistant one.
    Completed { is_error: bool },
}

/// Finishes the turn with an error if dropped before a reply is recorded.
struct PendingTurn {
    conversation: SharedConversation,
    finished: bool,
}

impl PendingTurn {
    fn finish(mut self, result: Result<String, AssistantError>) {
        lock(&self.conversation).finish_submit(result);
        self.finished = true;
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        if !self.finished {
            lock(&self.conversation).finish_submit(Err(AssistantError::RequestFailed("request abandoned".into())));
        }
    }
}

/// Submit `text` on `conversation`, asking `assistant` for the reply.
///
/// The conversation lock is never held across the model round-trip.
pub async fn submit(
    conversation: SharedConversation,
    assistant: Arc<tokio::sync::Mutex<AssistantAdapter>>,
    text: String,
) -> SubmitOutcome {
    let begun = lock(&conversation).begin_submit(&text);
    let Some(message) = begun else {
        info!("conversation: submit ignored");
        return SubmitOutcome::Ignored;
    };

    let pending = PendingTurn { conversation, finished: false };
    let result = assistant.lock().await.send(&message).await;
    let is_error = result.is_err();
    pending.finish(result);

    SubmitOutcome::Completed { is_error }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;
