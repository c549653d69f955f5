//! Search history persistence port

use async_trait::async_trait;
use domain::{HistoryEntry, UserId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for storing search history entries
///
/// Implementations report failures; the silent policy lives in
/// [`crate::services::HistoryStore`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Persist a new entry
    async fn append(&self, entry: &HistoryEntry) -> Result<(), ApplicationError>;

    /// Entries for a user, newest first, at most `limit`
    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ApplicationError>;

    /// Delete every entry for a user, returning how many were removed
    async fn clear(&self, user_id: &UserId) -> Result<u64, ApplicationError>;
}
