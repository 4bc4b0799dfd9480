//! Shell service: welcome vs. document view, and the assistant panel.
//!
//! DESIGN
//! ======
//! The shell owns the view mode, the current document link, panel
//! visibility and the live conversation. Opening a document validates the
//! link before anything else happens; a rejected link changes no state and
//! writes no history. Going back to the welcome screen closes the panel and
//! starts a fresh conversation. A reply still in flight lands on the old
//! conversation, which nobody shows any more.

use serde::Serialize;
use tracing::info;

use super::conversation::{Conversation, SharedConversation};
use super::document::{self, DocumentError};
use super::history::RecentDocument;
use crate::state::AppState;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("no document is open")]
    NotInDocumentMode,
}

impl crate::error::ErrorCode for ShellError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInDocumentMode => "E_NOT_IN_DOCUMENT_MODE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Welcome,
    Document,
}

/// What the page needs to render the current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellView {
    pub mode: ViewMode,
    /// Link as the user supplied it.
    pub url: Option<String>,
    /// Canonical link for the iframe and the "open in new tab" button.
    pub embed_url: Option<String>,
    pub assistant_open: bool,
}

// =============================================================================
// SHELL
// =============================================================================

pub struct Shell {
    mode: ViewMode,
    current_url: Option<String>,
    assistant_open: bool,
    conversation: SharedConversation,
}

impl Shell {
    #[must_use]
    pub fn new() -> Self {
        Self { mode: ViewMode::Welcome, current_url: None, assistant_open: false, conversation: Conversation::shared() }
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Switch to the document view for an already validated link.
    pub fn show_document(&mut self, link: &str) {
        self.current_url = Some(link.to_string());
        self.mode = ViewMode::Document;
    }

    pub fn return_home(&mut self) {
        self.mode = ViewMode::Welcome;
        self.assistant_open = false;
        self.conversation = Conversation::shared();
    }

    /// Flip panel visibility. Returns the new visibility.
    ///
    /// # Errors
    ///
    /// [`ShellError::NotInDocumentMode`] on the welcome screen.
    pub fn toggle_assistant(&mut self) -> Result<bool, ShellError> {
        self.require_document()?;
        self.assistant_open = !self.assistant_open;
        Ok(self.assistant_open)
    }

    /// Hide the panel. Any pending reply keeps running.
    pub fn close_assistant(&mut self) {
        self.assistant_open = false;
    }

    /// The conversation shown next to the open document.
    ///
    /// # Errors
    ///
    /// [`ShellError::NotInDocumentMode`] on the welcome screen.
    pub fn document_conversation(&self) -> Result<SharedConversation, ShellError> {
        self.require_document()?;
        Ok(self.conversation.clone())
    }

    #[must_use]
    pub fn view(&self) -> ShellView {
        let url = match self.mode {
            ViewMode::Document => self.current_url.clone(),
            ViewMode::Welcome => None,
        };
        ShellView {
            mode: self.mode,
            embed_url: url.as_deref().map(document::normalize),
            url,
            assistant_open: self.assistant_open,
        }
    }

    fn require_document(&self) -> Result<(), ShellError> {
        match self.mode {
            ViewMode::Document => Ok(()),
            ViewMode::Welcome => Err(ShellError::NotInDocumentMode),
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// OPEN DOCUMENT
// =============================================================================

/// Result of a successful [`open_document`].
#[derive(Debug, Clone, Serialize)]
pub struct OpenedDocument {
    pub view: ShellView,
    pub history: Vec<RecentDocument>,
}

/// Validate `raw`, record it in the recent list and show it.
///
/// # Errors
///
/// A [`DocumentError`] for blank or foreign links; nothing is changed then.
pub async fn open_document(state: &AppState, raw: &str) -> Result<OpenedDocument, DocumentError> {
    let link = document::validate_link(raw)?;

    let history = state.history.lock().await.record(link).await;

    let view = {
        let mut shell = state.shell.write().await;
        shell.show_document(link);
        shell.view()
    };

    info!(url = %link, "shell: document opened");
    Ok(OpenedDocument { view, history })
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
