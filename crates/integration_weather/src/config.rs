//! Weather client configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::WeatherError;

/// OpenWeather configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    /// One-call endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overview endpoint
    #[serde(default = "default_overview_url")]
    pub overview_url: String,

    /// API key (sensitive)
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: SecretString,

    /// Unit system (`metric`, `imperial` or `standard`)
    #[serde(default = "default_units")]
    pub units: String,

    /// Language of condition descriptions
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/3.0/onecall".to_string()
}

fn default_overview_url() -> String {
    "https://api.openweathermap.org/data/3.0/onecall/overview".to_string()
}

fn default_api_key() -> SecretString {
    SecretString::from(String::new())
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_language() -> String {
    "vi".to_string()
}

const fn default_timeout() -> u64 {
    10
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            overview_url: default_overview_url(),
            api_key: default_api_key(),
            units: default_units(),
            language: default_language(),
            timeout_secs: default_timeout(),
        }
    }
}

impl OpenWeatherConfig {
    /// Whether an API key has been provided
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), WeatherError> {
        for (field, value) in [
            ("weather.base_url", &self.base_url),
            ("weather.overview_url", &self.overview_url),
        ] {
            Url::parse(value).map_err(|e| {
                WeatherError::ConfigurationError(format!("{field} is not a valid URL: {e}"))
            })?;
        }
        if !matches!(self.units.as_str(), "metric" | "imperial" | "standard") {
            return Err(WeatherError::ConfigurationError(format!(
                "weather.units must be metric, imperial or standard, got {:?}",
                self.units
            )));
        }
        if self.timeout_secs == 0 {
            return Err(WeatherError::ConfigurationError(
                "weather.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
