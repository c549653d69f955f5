//! Client configuration

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::OsmError;

fn validate_url(field: &str, value: &str) -> Result<(), OsmError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| OsmError::ConfigurationError(format!("{field} is not a valid URL: {e}")))
}

fn validate_timeout(field: &str, value: u64) -> Result<(), OsmError> {
    if value == 0 {
        return Err(OsmError::ConfigurationError(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

/// Configuration for the Nominatim geocoding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent sent with every request (required by the usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Cache TTL in hours (0 to disable)
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// Comma-separated ISO country codes to restrict results to (empty for none)
    #[serde(default)]
    pub country_filter: String,

    /// Preferred languages for display names
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_geocoding_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("placefinder/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_accept_language() -> String {
    "vi,en".to_string()
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            timeout_secs: default_geocoding_timeout_secs(),
            user_agent: default_user_agent(),
            cache_ttl_hours: default_cache_ttl_hours(),
            country_filter: String::new(),
            accept_language: default_accept_language(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            cache_ttl_hours: 0,
            ..Default::default()
        }
    }

    /// Check if caching is enabled
    #[must_use]
    pub const fn caching_enabled(&self) -> bool {
        self.cache_ttl_hours > 0
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), OsmError> {
        validate_url("geocoding.base_url", &self.base_url)?;
        validate_timeout("geocoding.timeout_secs", self.timeout_secs)?;
        if self.user_agent.trim().is_empty() {
            return Err(OsmError::ConfigurationError(
                "geocoding.user_agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the Overpass POI service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Interpreter endpoint URL
    #[serde(default = "default_overpass_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_overpass_timeout_secs")]
    pub timeout_secs: u64,

    /// Server-side query timeout embedded in the query (`[timeout:N]`)
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u32,

    /// Maximum elements the server returns (`out center N`)
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

const fn default_overpass_timeout_secs() -> u64 {
    35
}

const fn default_query_timeout_secs() -> u32 {
    30
}

const fn default_fetch_limit() -> u32 {
    20
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: default_overpass_url(),
            timeout_secs: default_overpass_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

impl OverpassConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), OsmError> {
        validate_url("poi.base_url", &self.base_url)?;
        validate_timeout("poi.timeout_secs", self.timeout_secs)?;
        validate_timeout("poi.query_timeout_secs", u64::from(self.query_timeout_secs))?;
        if self.fetch_limit == 0 {
            return Err(OsmError::ConfigurationError(
                "poi.fetch_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the OSRM routing service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsrmConfig {
    /// Base URL of the OSRM server
    #[serde(default = "default_osrm_url")]
    pub base_url: String,

    /// Routing profile (`driving`, `walking`, `cycling`)
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Request timeout in seconds
    #[serde(default = "default_osrm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_osrm_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_profile() -> String {
    "driving".to_string()
}

const fn default_osrm_timeout_secs() -> u64 {
    10
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: default_osrm_url(),
            profile: default_profile(),
            timeout_secs: default_osrm_timeout_secs(),
        }
    }
}

impl OsrmConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), OsmError> {
        validate_url("routing.base_url", &self.base_url)?;
        validate_timeout("routing.timeout_secs", self.timeout_secs)?;
        let valid_profile = !self.profile.is_empty()
            && self
                .profile
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_profile {
            return Err(OsmError::ConfigurationError(format!(
                "routing.profile is not a valid profile name: {:?}",
                self.profile
            )));
        }
        Ok(())
    }
}
