//! Recent-documents store: last 10 opened links, persisted as JSON.
//!
//! DESIGN
//! ======
//! The list is tiny, so every `record` is a full read-modify-write of one
//! file. Writes go to a sibling temp file that is renamed into place, so a
//! crash mid-write leaves the previous list intact. Unreadable or corrupt
//! data degrades to an empty history; it is logged and never surfaced.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Maximum number of entries kept.
pub const MAX_RECENT_DOCUMENTS: usize = 10;

/// One previously opened document link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDocument {
    pub id: String,
    pub url: String,
    /// Timestamp-derived display title, e.g. `Sheet 14:03:59`.
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_accessed: OffsetDateTime,
}

impl RecentDocument {
    #[must_use]
    pub fn new(url: &str, now: OffsetDateTime) -> Self {
        Self { id: Uuid::new_v4().to_string(), url: url.to_string(), title: title_for(now), last_accessed: now }
    }
}

fn title_for(now: OffsetDateTime) -> String {
    let clock = now
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default();
    format!("Sheet {clock}")
}

/// Local wall-clock time, or UTC when the local offset cannot be determined.
fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Put `entry` at the head of `history`, dropping any older entry with the
/// same URL and anything past the cap.
#[must_use]
pub fn push_recent(history: Vec<RecentDocument>, entry: RecentDocument) -> Vec<RecentDocument> {
    let rest: Vec<RecentDocument> = history
        .into_iter()
        .filter(|h| h.url != entry.url)
        .take(MAX_RECENT_DOCUMENTS - 1)
        .collect();
    let mut next = Vec::with_capacity(MAX_RECENT_DOCUMENTS);
    next.push(entry);
    next.extend(rest);
    next
}

/// Drop duplicate URLs (first wins) and cap the length.
fn sanitize(history: Vec<RecentDocument>) -> Vec<RecentDocument> {
    let mut out: Vec<RecentDocument> = Vec::with_capacity(history.len().min(MAX_RECENT_DOCUMENTS));
    for item in history {
        if out.len() == MAX_RECENT_DOCUMENTS {
            break;
        }
        if !out.iter().any(|o| o.url == item.url) {
            out.push(item);
        }
    }
    out
}

// =============================================================================
// STORE
// =============================================================================

/// File-backed recent-documents list.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted list. Missing or malformed data yields an empty list.
    pub async fn load(&self) -> Vec<RecentDocument> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "history: read failed, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<RecentDocument>>(&raw) {
            Ok(history) => sanitize(history),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "history: corrupt data, starting empty");
                Vec::new()
            }
        }
    }

    /// Record `url` as the most recently opened document and persist the list.
    pub async fn record(&self, url: &str) -> Vec<RecentDocument> {
        self.record_at(url, now_local()).await
    }

    pub(crate) async fn record_at(&self, url: &str, now: OffsetDateTime) -> Vec<RecentDocument> {
        let history = push_recent(self.load().await, RecentDocument::new(url, now));

        match self.persist(&history).await {
            Ok(()) => info!(count = history.len(), "history: recorded document"),
            Err(e) => error!(error = %e, path = %self.path.display(), "history: persist failed"),
        }

        history
    }

    async fn persist(&self, history: &[RecentDocument]) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(history).map_err(std::io::Error::other)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
