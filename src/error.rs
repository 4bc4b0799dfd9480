//! Error codes shared by every service error.
//!
//! DESIGN
//! ======
//! Each module owns a `thiserror` enum. The enum implements [`ErrorCode`] so
//! the HTTP layer can render `{code, message, retryable}` without knowing
//! anything about the module it came from.

use serde::Serialize;

/// Grepable error code plus a retry hint.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON error body returned by API routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}
