//! Assistant panel routes: visibility, session status, chat.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::ApiError;
use crate::error::ErrorCode;
use crate::services::assistant::SessionStatus;
use crate::services::conversation::{self, ChatTurn, SharedConversation, SubmitOutcome};
use crate::services::shell::{ShellError, ShellView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub text: String,
}

/// Snapshot of the conversation shown in the panel.
#[derive(Debug, Serialize)]
pub struct ChatSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubmitOutcome>,
    pub turns: Vec<ChatTurn>,
    pub loading: bool,
}

fn snapshot(conversation: &SharedConversation, outcome: Option<SubmitOutcome>) -> ChatSnapshot {
    let c = conversation::lock(conversation);
    ChatSnapshot { outcome, turns: c.turns().to_vec(), loading: c.loading() }
}

pub(crate) fn shell_error_to_status(err: &ShellError) -> StatusCode {
    match err {
        ShellError::NotInDocumentMode => StatusCode::CONFLICT,
    }
}

fn shell_error(err: &ShellError) -> ApiError {
    ApiError::new(shell_error_to_status(err), err)
}

#[derive(Debug, thiserror::Error)]
#[error("chat request aborted")]
struct SubmitAborted;

impl ErrorCode for SubmitAborted {
    fn error_code(&self) -> &'static str {
        "E_SUBMIT_ABORTED"
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// `GET /api/assistant`: session state of the assistant adapter.
pub async fn status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.assistant.lock().await.status())
}

/// `POST /api/assistant/toggle`: show or hide the panel.
pub async fn toggle(State(state): State<AppState>) -> Result<Json<ShellView>, ApiError> {
    let mut shell = state.shell.write().await;
    shell.toggle_assistant().map_err(|e| shell_error(&e))?;
    Ok(Json(shell.view()))
}

/// `POST /api/assistant/close`: hide the panel; a pending reply still lands.
pub async fn close(State(state): State<AppState>) -> Json<ShellView> {
    let mut shell = state.shell.write().await;
    shell.close_assistant();
    Json(shell.view())
}

/// `GET /api/chat`: turns of the current conversation.
pub async fn get_chat(State(state): State<AppState>) -> Result<Json<ChatSnapshot>, ApiError> {
    let conversation = state
        .shell
        .read()
        .await
        .document_conversation()
        .map_err(|e| shell_error(&e))?;
    Ok(Json(snapshot(&conversation, None)))
}

/// `POST /api/chat`: submit a message and wait for the reply.
///
/// The exchange runs on its own task, so a client that disconnects does not
/// cancel it and the reply is still appended.
pub async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatSnapshot>, ApiError> {
    let conversation = state
        .shell
        .read()
        .await
        .document_conversation()
        .map_err(|e| shell_error(&e))?;

    let task = tokio::spawn(conversation::submit(conversation.clone(), state.assistant.clone(), body.text));
    let outcome = task.await.map_err(|e| {
        error!(error = %e, "chat: submit task failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, &SubmitAborted)
    })?;

    Ok(Json(snapshot(&conversation, Some(outcome))))
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
