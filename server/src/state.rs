//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The session store and the record table are both explicit instances
//! built in `main` — nothing in the process is a hidden global, which is
//! what lets tests run against an in-memory backend.

use crate::services::records::RecordStore;
use crate::services::session::SessionStore;

/// Shared application state. Clone is required by Axum — both fields are
/// cheaply clonable handles onto shared data.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub records: RecordStore,
}

impl AppState {
    #[must_use]
    pub fn new(sessions: SessionStore, records: RecordStore) -> Self {
        Self { sessions, records }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
