//! SQLite search history store
//!
//! Implements the HistoryRepository port using SQLite.

use std::sync::Arc;

use application::{error::ApplicationError, ports::HistoryRepository};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{GeoLocation, HistoryEntry, HistoryEntryId, UserId};
use rusqlite::{Row, params};
use tokio::task;
use tracing::{debug, instrument, warn};

use super::connection::ConnectionPool;

/// SQLite-based search history store
#[derive(Debug, Clone)]
pub struct SqliteHistoryStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteHistoryStore {
    /// Create a new SQLite history store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

/// A row as stored, before validation
struct StoredEntry {
    id: String,
    user_id: String,
    query_text: String,
    latitude: f64,
    longitude: f64,
    result_count: u32,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    Ok(StoredEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        query_text: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        result_count: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl StoredEntry {
    fn into_entry(self) -> Result<HistoryEntry, String> {
        let id = HistoryEntryId::parse(&self.id).map_err(|e| e.to_string())?;
        let user_id = UserId::parse(&self.user_id).map_err(|e| e.to_string())?;
        let location = GeoLocation::new(self.latitude, self.longitude).map_err(|e| e.to_string())?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| e.to_string())?
            .with_timezone(&Utc);
        Ok(HistoryEntry::restore(
            id,
            user_id,
            self.query_text,
            location,
            self.result_count,
            created_at,
        ))
    }
}

/// Fixed-width UTC timestamps sort lexically in time order
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl HistoryRepository for SqliteHistoryStore {
    #[instrument(skip(self, entry), fields(user_id = %entry.user_id(), entry_id = %entry.id()))]
    async fn append(&self, entry: &HistoryEntry) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let entry = entry.clone();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;

            conn.execute(
                "INSERT INTO search_history
                    (id, user_id, query_text, latitude, longitude, result_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.id().to_string(),
                    entry.user_id().as_str(),
                    entry.query_text(),
                    entry.location().latitude(),
                    entry.location().longitude(),
                    entry.result_count(),
                    format_timestamp(entry.created_at()),
                ],
            )
            .map_err(|e| ApplicationError::Internal(e.to_string()))?;

            debug!("Appended history entry");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let user_id = user_id.as_str().to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;

            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, query_text, latitude, longitude, result_count, created_at
                     FROM search_history
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2",
                )
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;

            let rows = stmt
                .query_map(params![user_id, limit], read_row)
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;

            let mut entries = Vec::new();
            for row in rows {
                let stored = row.map_err(|e| ApplicationError::Internal(e.to_string()))?;
                let row_id = stored.id.clone();
                match stored.into_entry() {
                    Ok(entry) => entries.push(entry),
                    Err(reason) => warn!(%row_id, %reason, "Skipping malformed history row"),
                }
            }

            debug!(count = entries.len(), "Loaded history entries");
            Ok(entries)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    async fn clear(&self, user_id: &UserId) -> Result<u64, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let user_id = user_id.as_str().to_string();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;

            let deleted = conn
                .execute("DELETE FROM search_history WHERE user_id = ?1", [&user_id])
                .map_err(|e| ApplicationError::Internal(e.to_string()))?;

            debug!(deleted, "Cleared history");
            Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::persistence::{IN_MEMORY, create_pool};

    fn store() -> SqliteHistoryStore {
        let pool = create_pool(&DatabaseConfig {
            path: IN_MEMORY.to_string(),
            max_connections: 1,
            run_migrations: true,
        })
        .unwrap();
        SqliteHistoryStore::new(Arc::new(pool))
    }

    #[test]
    fn timestamps_are_fixed_width() {
        let a = format_timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let b = format_timestamp(DateTime::from_timestamp(1_700_000_000, 120_000_000).unwrap());
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert!(a.ends_with('Z'));
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let store = store();
        let user = UserId::parse("user-1").unwrap();
        store
            .append(&HistoryEntry::new(
                user.clone(),
                "Quận 1",
                GeoLocation::ho_chi_minh_city(),
                3,
            ))
            .await
            .unwrap();

        {
            let conn = store.pool.get().unwrap();
            conn.execute(
                "INSERT INTO search_history VALUES ('not-a-uuid', 'user-1', 'x', 0.0, 0.0, 0, '2099-01-01T00:00:00.000000Z')",
                [],
            )
            .unwrap();
        }

        let entries = store.list_recent(&user, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query_text(), "Quận 1");
    }
}
