//! Weather service port
//!
//! The numeric forecast and the textual overview are separate calls so that
//! either can fail without affecting the other.

use async_trait::async_trait;
use domain::{GeoLocation, WeatherOverview, WeatherSnapshot};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for weather data retrieval
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Current, hourly and daily conditions for a location
    async fn get_forecast(
        &self,
        location: &GeoLocation,
    ) -> Result<WeatherSnapshot, ApplicationError>;

    /// Textual overview for a location
    async fn get_overview(
        &self,
        location: &GeoLocation,
    ) -> Result<WeatherOverview, ApplicationError>;
}
