//! Shell and recent-document routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::services::document::{self, DocumentError};
use crate::services::history::RecentDocument;
use crate::services::shell::{self, OpenedDocument, ShellView};
use crate::state::AppState;

/// Recent-list entry with its display label.
#[derive(Debug, Serialize)]
pub struct RecentDocumentResponse {
    #[serde(flatten)]
    pub document: RecentDocument,
    pub label: String,
}

fn to_response(document: RecentDocument) -> RecentDocumentResponse {
    let label = document::document_label(&document.url);
    RecentDocumentResponse { document, label }
}

#[derive(Debug, Deserialize)]
pub struct OpenDocumentBody {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct OpenDocumentResponse {
    pub view: ShellView,
    pub history: Vec<RecentDocumentResponse>,
}

pub(crate) fn document_error_to_status(err: &DocumentError) -> StatusCode {
    match err {
        DocumentError::Empty | DocumentError::InvalidDocumentLink => StatusCode::BAD_REQUEST,
    }
}

/// `GET /api/history`: recent documents, most recent first.
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<RecentDocumentResponse>> {
    let history = state.history.lock().await.load().await;
    Json(history.into_iter().map(to_response).collect())
}

/// `POST /api/documents/open`: validate a link, record it, show it.
pub async fn open_document(
    State(state): State<AppState>,
    Json(body): Json<OpenDocumentBody>,
) -> Result<Json<OpenDocumentResponse>, ApiError> {
    let OpenedDocument { view, history } = shell::open_document(&state, &body.url)
        .await
        .map_err(|e| ApiError::new(document_error_to_status(&e), &e))?;

    Ok(Json(OpenDocumentResponse { view, history: history.into_iter().map(to_response).collect() }))
}

/// `GET /api/view`: current view mode and document links.
pub async fn get_view(State(state): State<AppState>) -> Json<ShellView> {
    Json(state.shell.read().await.view())
}

/// `POST /api/view/home`: back to the welcome screen.
pub async fn return_home(State(state): State<AppState>) -> Json<ShellView> {
    let mut shell = state.shell.write().await;
    shell.return_home();
    Json(shell.view())
}

#[cfg(test)]
#[path = "documents_test.rs"]
mod tests;
