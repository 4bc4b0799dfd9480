//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API under `/api` for the shell, recent documents and the assistant
//! panel, plus the static page that renders them. The page is a thin client:
//! every piece of state lives in [`AppState`].

pub mod assistant;
pub mod documents;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::{ErrorBody, ErrorCode};
use crate::state::AppState;

/// Error response: status code plus `{code, message, retryable}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, body: ErrorBody::from_error(err) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// API routes.
fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/history", get(documents::list_history))
        .route("/api/documents/open", post(documents::open_document))
        .route("/api/view", get(documents::get_view))
        .route("/api/view/home", post(documents::return_home))
        .route("/api/assistant", get(assistant::status))
        .route("/api/assistant/toggle", post(assistant::toggle))
        .route("/api/assistant/close", post(assistant::close))
        .route("/api/chat", get(assistant::get_chat).post(assistant::post_chat))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Full application: API routes with the static page as fallback.
pub fn app(state: AppState, static_dir: &Path) -> Router {
    let site = ServeDir::new(static_dir).append_index_html_on_directories(true);

    api_routes(state)
        .fallback_service(site)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
