//! Builds the services from configuration

use std::sync::Arc;

use anyhow::Context;
use application::{HistoryPanel, HistoryStore, RouteWorkflow, SearchOrchestrator, SearchSettings};
use domain::{PoiCategory, UserId};
use infrastructure::{
    AppConfig, GeocodingAdapter, PoiDiscoveryAdapter, RoutingAdapter, SqliteHistoryStore,
    WeatherAdapter, create_pool,
};
use tracing::debug;

/// Everything a command needs
#[derive(Debug)]
pub struct App {
    pub orchestrator: Arc<SearchOrchestrator>,
    pub routes: RouteWorkflow,
    pub history: HistoryStore,
    settings: SearchSettings,
}

impl App {
    /// Wire adapters, the history database and the services
    ///
    /// `category` overrides `search.category` for this run.
    pub fn from_config(config: &AppConfig, category: Option<PoiCategory>) -> anyhow::Result<Self> {
        let mut settings = config.search.clone();
        if let Some(category) = category {
            settings.category = category;
        }
        settings.validate()?;

        let user_agent = config.geocoding.user_agent.as_str();
        let geocoder = GeocodingAdapter::from_config(&config.geocoding)?;
        let pois = PoiDiscoveryAdapter::from_config(&config.poi, user_agent)?;
        let routing = RoutingAdapter::from_config(&config.routing, user_agent)?;
        let weather = WeatherAdapter::from_config(&config.weather)?;

        let pool = create_pool(&config.database).with_context(|| {
            format!("failed to open history database {}", config.database.path)
        })?;
        let history = HistoryStore::new(Arc::new(SqliteHistoryStore::new(Arc::new(pool))));
        debug!(
            database = %config.database.path,
            weather = weather.is_enabled(),
            "Services wired"
        );

        let orchestrator = Arc::new(SearchOrchestrator::new(
            Arc::new(geocoder),
            Arc::new(pois),
            Arc::new(weather),
            history.clone(),
            settings.clone(),
        ));

        Ok(Self {
            orchestrator,
            routes: RouteWorkflow::new(Arc::new(routing)),
            history,
            settings,
        })
    }

    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// History panel for `user_id`
    #[must_use]
    pub fn history_panel(&self, user_id: UserId) -> HistoryPanel {
        HistoryPanel::new(self.history.clone(), Some(user_id), &self.settings)
    }
}
