//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the shell (view mode, open document, live conversation), the
//! recent-documents store, and the single assistant adapter for the process.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::services::assistant::{AssistantAdapter, SessionFactory};
use crate::services::history::HistoryStore;
use crate::services::shell::Shell;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; every field is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<RwLock<Shell>>,
    /// Serializes the history read-modify-write cycle.
    pub history: Arc<Mutex<HistoryStore>>,
    /// Held for the whole model round-trip.
    pub assistant: Arc<Mutex<AssistantAdapter>>,
}

impl AppState {
    #[must_use]
    pub fn new(history: HistoryStore, factory: impl SessionFactory + 'static) -> Self {
        Self {
            shell: Arc::new(RwLock::new(Shell::new())),
            history: Arc::new(Mutex::new(history)),
            assistant: Arc::new(Mutex::new(AssistantAdapter::new(factory))),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
