//! History panel state machine
//!
//! ```text
//! collapsed -> loading -> populated | empty | error
//!     ^__________________________/
//! ```
//!
//! Opening always reloads, so an empty panel picks up searches made since.
//! Selecting an entry collapses the panel and hands the entry back for
//! replay.

use std::time::Duration;

use domain::{HistoryEntry, UserId};
use tracing::{debug, warn};

use crate::services::history_store::HistoryStore;
use crate::settings::SearchSettings;

/// Visible state of the history panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Collapsed,
    Loading,
    Populated(Vec<HistoryEntry>),
    Empty,
    Error(String),
}

impl PanelState {
    #[must_use]
    pub const fn is_expanded(&self) -> bool {
        !matches!(self, Self::Collapsed)
    }
}

/// Recent-searches panel for one user
#[derive(Debug)]
pub struct HistoryPanel {
    store: HistoryStore,
    user_id: Option<UserId>,
    limit: usize,
    load_timeout: Duration,
    state: PanelState,
}

impl HistoryPanel {
    /// Panel for `user_id`; signed-out users always see an empty panel
    #[must_use]
    pub fn new(store: HistoryStore, user_id: Option<UserId>, settings: &SearchSettings) -> Self {
        Self {
            store,
            user_id,
            limit: settings.history_limit,
            load_timeout: Duration::from_secs(settings.history_load_timeout_secs),
            state: PanelState::Collapsed,
        }
    }

    #[must_use]
    pub const fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &PanelState {
        &self.state
    }

    /// Open when collapsed, collapse when open
    pub async fn toggle(&mut self) -> &PanelState {
        if self.state.is_expanded() {
            self.collapse();
        } else {
            self.open().await;
        }
        &self.state
    }

    /// Expand and (re)load the recent searches
    pub async fn open(&mut self) -> &PanelState {
        self.state = PanelState::Loading;

        let Some(user_id) = &self.user_id else {
            self.state = PanelState::Empty;
            return &self.state;
        };

        let loaded =
            tokio::time::timeout(self.load_timeout, self.store.list_recent(user_id, self.limit))
                .await;
        self.state = match loaded {
            Ok(entries) if entries.is_empty() => PanelState::Empty,
            Ok(entries) => {
                debug!(count = entries.len(), "History loaded");
                PanelState::Populated(entries)
            },
            Err(_) => {
                warn!(timeout = ?self.load_timeout, "Loading search history timed out");
                PanelState::Error("Could not load search history".to_string())
            },
        };
        &self.state
    }

    pub fn collapse(&mut self) {
        self.state = PanelState::Collapsed;
    }

    /// Pick the `index`-th shown entry, collapsing the panel
    pub fn select(&mut self, index: usize) -> Option<HistoryEntry> {
        let PanelState::Populated(entries) = &self.state else {
            return None;
        };
        let entry = entries.get(index).cloned()?;
        self.collapse();
        Some(entry)
    }
}
