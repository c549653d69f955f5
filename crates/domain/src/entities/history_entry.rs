//! Search history entry entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{GeoLocation, HistoryEntryId, UserId};

/// One past search owned by a user
///
/// Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    id: HistoryEntryId,
    user_id: UserId,
    query_text: String,
    location: GeoLocation,
    result_count: u32,
    created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Record a search that just completed
    #[must_use]
    pub fn new(
        user_id: UserId,
        query_text: impl Into<String>,
        location: GeoLocation,
        result_count: u32,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            user_id,
            query_text: query_text.into(),
            location,
            result_count,
            created_at: Utc::now(),
        }
    }

    /// Restore an entry from storage
    #[must_use]
    pub const fn restore(
        id: HistoryEntryId,
        user_id: UserId,
        query_text: String,
        location: GeoLocation,
        result_count: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            query_text,
            location,
            result_count,
            created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> HistoryEntryId {
        self.id
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// Coordinates the search resolved to
    #[must_use]
    pub const fn location(&self) -> GeoLocation {
        self.location
    }

    /// Number of POIs the search found
    #[must_use]
    pub const fn result_count(&self) -> u32 {
        self.result_count
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Relative age for list displays ("just now", "5 min ago", ...)
    #[must_use]
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.created_at);
        let minutes = elapsed.num_minutes();
        let hours = elapsed.num_hours();
        let days = elapsed.num_days();

        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{minutes} min ago")
        } else if hours < 24 {
            format!("{hours} h ago")
        } else if days < 7 {
            format!("{days} d ago")
        } else {
            self.created_at.format("%d/%m/%Y").to_string()
        }
    }
}
