//! Search history service
//!
//! Wraps a [`HistoryRepository`] with a silent failure policy: history is a
//! convenience, so storage problems are logged and never reach the caller.
//! A failed read looks exactly like an empty history.

use std::sync::Arc;

use domain::{HistoryEntry, UserId};
use tracing::{debug, info, instrument, warn};

use crate::ports::HistoryRepository;

/// Silent front for search history persistence
#[derive(Clone)]
pub struct HistoryStore {
    repository: Arc<dyn HistoryRepository>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("repository", &"<HistoryRepository>")
            .finish()
    }
}

impl HistoryStore {
    #[must_use]
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    /// Persist an entry; failures are logged and dropped
    #[instrument(skip(self, entry), fields(user_id = %entry.user_id(), entry_id = %entry.id()))]
    pub async fn append(&self, entry: &HistoryEntry) {
        match self.repository.append(entry).await {
            Ok(()) => debug!(result_count = entry.result_count(), "Search history entry saved"),
            Err(e) => warn!(error = %e, "Failed to save search history entry"),
        }
    }

    /// Most recent entries for a user, newest first
    ///
    /// Returns an empty list on any read failure.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn list_recent(&self, user_id: &UserId, max_results: usize) -> Vec<HistoryEntry> {
        match self.repository.list_recent(user_id, max_results).await {
            Ok(mut entries) => {
                entries.truncate(max_results);
                entries
            },
            Err(e) => {
                warn!(error = %e, "Failed to load search history");
                Vec::new()
            },
        }
    }

    /// Delete all entries for a user; failures are logged and dropped
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn clear(&self, user_id: &UserId) {
        match self.repository.clear(user_id).await {
            Ok(removed) => info!(removed, "Search history cleared"),
            Err(e) => warn!(error = %e, "Failed to clear search history"),
        }
    }
}
