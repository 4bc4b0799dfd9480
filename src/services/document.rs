//! Document links: validation, canonical embed URL, display label.
//!
//! DESIGN
//! ======
//! A shared spreadsheet is identified by the opaque segment after `/d/`.
//! Everything else in a pasted link (`#gid=0`, `/htmlview`, query params) is
//! noise for embedding, so the viewer rebuilds a canonical edit URL from that
//! segment alone. The Shell only validates; normalization happens when the
//! document view is rendered.

use std::sync::OnceLock;

use regex::Regex;

/// Substring every accepted document link must contain.
pub const SHEETS_LINK_MARKER: &str = "google.com/spreadsheets";

const EMBED_URL_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";
const EMBED_URL_SUFFIX: &str = "/edit?usp=sharing";
const LABEL_PREFIX: &str = "Google Sheet";
const LABEL_ID_CHARS: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Please enter a Google Sheets URL")]
    Empty,
    #[error("Please enter a valid Google Sheets URL")]
    InvalidDocumentLink,
}

impl crate::error::ErrorCode for DocumentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_EMPTY_DOCUMENT_LINK",
            Self::InvalidDocumentLink => "E_INVALID_DOCUMENT_LINK",
        }
    }
}

fn document_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").ok())
        .as_ref()
}

/// Extract the opaque document identifier following `/d/`, if present.
#[must_use]
pub fn document_id(raw_url: &str) -> Option<&str> {
    document_id_pattern()?
        .captures(raw_url)?
        .get(1)
        .map(|m| m.as_str())
}

/// Map a sharing link to the canonical embeddable edit URL.
///
/// Links without a `/d/<id>` segment come back unchanged.
#[must_use]
pub fn normalize(raw_url: &str) -> String {
    match document_id(raw_url) {
        Some(id) => format!("{EMBED_URL_PREFIX}{id}{EMBED_URL_SUFFIX}"),
        None => raw_url.to_string(),
    }
}

/// Check that `raw` looks like a shareable spreadsheet link. Returns the
/// trimmed link.
///
/// # Errors
///
/// [`DocumentError::Empty`] for blank input, [`DocumentError::InvalidDocumentLink`]
/// when the link does not point at the spreadsheet service.
pub fn validate_link(raw: &str) -> Result<&str, DocumentError> {
    let link = raw.trim();
    if link.is_empty() {
        return Err(DocumentError::Empty);
    }
    if !link.contains(SHEETS_LINK_MARKER) {
        return Err(DocumentError::InvalidDocumentLink);
    }
    Ok(link)
}

/// Short label for the recent-documents list, e.g. `Google Sheet 1BxiMVs0...`.
#[must_use]
pub fn document_label(url: &str) -> String {
    match url.split_once("/d/") {
        Some((_, rest)) => {
            let short: String = rest.chars().take(LABEL_ID_CHARS).collect();
            format!("{LABEL_PREFIX} {short}...")
        }
        None => LABEL_PREFIX.to_string(),
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
