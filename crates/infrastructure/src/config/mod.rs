//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `config.toml` (or the file passed explicitly), then environment
//! variables such as `PLACEFINDER_WEATHER__API_KEY`.

mod database;

use std::path::Path;

use application::{ApplicationError, SearchSettings};
use integration_osm::{NominatimConfig, OsrmConfig, OverpassConfig};
use integration_weather::OpenWeatherConfig;
use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;

use crate::telemetry::TelemetryConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PLACEFINDER";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

pub(crate) const fn default_true() -> bool {
    true
}

fn config_error(e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Configuration(e.to_string())
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Nominatim geocoding
    #[serde(default)]
    pub geocoding: NominatimConfig,

    /// Overpass POI discovery
    #[serde(default)]
    pub poi: OverpassConfig,

    /// OSRM routing
    #[serde(default)]
    pub routing: OsrmConfig,

    /// OpenWeather
    #[serde(default)]
    pub weather: OpenWeatherConfig,

    /// Search pipeline tunables
    #[serde(default)]
    pub search: SearchSettings,

    /// History database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of the default file
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // e.g. PLACEFINDER_SEARCH__RADIUS_METERS=800
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate every section
    ///
    /// A missing weather API key is not an error here; weather then reports
    /// itself unavailable at search time.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.geocoding.validate().map_err(config_error)?;
        self.poi.validate().map_err(config_error)?;
        self.routing.validate().map_err(config_error)?;
        self.weather.validate().map_err(config_error)?;
        self.search.validate()?;

        if self.database.path.trim().is_empty() {
            return Err(ApplicationError::Configuration(
                "database.path must not be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ApplicationError::Configuration(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
