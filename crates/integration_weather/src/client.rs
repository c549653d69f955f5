//! OpenWeather HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::OpenWeatherConfig;
use crate::error::WeatherError;
use crate::models::{ApiErrorBody, OneCallResponse, OverviewResponse};

/// Weather client trait for fetching weather data
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Current, hourly and daily forecast for a location
    async fn get_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<OneCallResponse, WeatherError>;

    /// Textual overview for a location
    async fn get_overview(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<OverviewResponse, WeatherError>;
}

/// OpenWeather One Call 3.0 client
#[derive(Debug)]
pub struct OpenWeatherClient {
    client: Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured, the configuration is
    /// invalid, or the HTTP client cannot be initialized.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, WeatherError> {
        if !config.has_api_key() {
            return Err(WeatherError::ConfigurationError(
                "weather.api_key is not set".to_string(),
            ));
        }
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::ConfigurationError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Validate coordinates
    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("appid", self.config.api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WeatherError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    // The URL carries the API key.
                    WeatherError::ConnectionFailed(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::ConnectionFailed(e.without_url().to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .map_or_else(|| format!("HTTP {status}"), |m| format!("HTTP {status}: {m}"));
            return Err(match status {
                StatusCode::UNAUTHORIZED => WeatherError::Unauthorized(detail),
                StatusCode::TOO_MANY_REQUESTS => WeatherError::RateLimitExceeded,
                s if s.is_server_error() => WeatherError::ServiceUnavailable(detail),
                _ => WeatherError::RequestFailed(detail),
            });
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn get_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<OneCallResponse, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;
        debug!("Fetching weather forecast");

        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("units", self.config.units.clone()),
            ("lang", self.config.language.clone()),
        ];
        let response: OneCallResponse = self.fetch(&self.config.base_url, &params).await?;

        debug!(
            hourly = response.hourly.len(),
            daily = response.daily.len(),
            "Weather forecast received"
        );
        Ok(response)
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn get_overview(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<OverviewResponse, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;
        debug!("Fetching weather overview");

        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("units", self.config.units.clone()),
        ];
        self.fetch(&self.config.overview_url, &params).await
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn keyed_config() -> OpenWeatherConfig {
        OpenWeatherConfig {
            api_key: SecretString::from("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn requires_api_key() {
        let err = OpenWeatherClient::new(OpenWeatherConfig::default()).unwrap_err();
        assert!(matches!(err, WeatherError::ConfigurationError(_)));
    }

    #[test]
    fn builds_with_key() {
        assert!(OpenWeatherClient::new(keyed_config()).is_ok());
    }

    #[test]
    fn validate_coordinates_bounds() {
        assert!(OpenWeatherClient::validate_coordinates(10.776, 106.7).is_ok());
        assert!(OpenWeatherClient::validate_coordinates(90.0, 180.0).is_ok());
        assert!(OpenWeatherClient::validate_coordinates(90.1, 0.0).is_err());
        assert!(OpenWeatherClient::validate_coordinates(0.0, -180.5).is_err());
        assert!(OpenWeatherClient::validate_coordinates(f64::NAN, 0.0).is_err());
    }
}
