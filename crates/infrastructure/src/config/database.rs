//! Search history database settings
//!
//! History lives in one SQLite file next to the binary unless `path` says
//! otherwise. `:memory:` keeps it for the lifetime of the process only.

use serde::{Deserialize, Serialize};

use super::default_true;

/// SQLite database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (`:memory:` for a private in-memory database)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Pool size for history reads and writes
    ///
    /// Writes are one row per finished search, so a handful is plenty. An
    /// in-memory database always uses a single connection.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Create or upgrade the `search_history` table when the pool opens
    ///
    /// Turn off only when the schema is managed outside placefinder.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_path() -> String {
    "placefinder.db".to_string()
}

const fn default_max_connections() -> u32 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}
