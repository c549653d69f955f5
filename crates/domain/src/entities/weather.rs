//! Weather entities
//!
//! Numeric forecast data and the independently fetched textual overview.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::GeoLocation;

/// Weather condition as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Provider condition code
    pub id: u16,
    /// Condition group (e.g. "Rain")
    pub main: String,
    /// Localized description (e.g. "mưa nhẹ")
    pub description: String,
    /// Icon code (e.g. "10d")
    pub icon: String,
}

impl WeatherCondition {
    /// URL of the provider's icon image at 2x scale
    #[must_use]
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }

    /// Emoji for the icon code
    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self.icon.as_str() {
            "01d" => "☀️",
            "01n" => "🌙",
            "02d" => "⛅",
            "02n" | "03d" | "03n" | "04d" | "04n" => "☁️",
            "09d" | "09n" | "10n" => "🌧️",
            "10d" => "🌦️",
            "11d" | "11n" => "⛈️",
            "13d" | "13n" => "❄️",
            "50d" | "50n" => "🌫️",
            _ => "❓",
        }
    }
}

/// Conditions at observation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Observation time
    pub observed_at: DateTime<Utc>,
    /// Temperature in the configured units
    pub temperature: f64,
    /// Apparent temperature
    pub feels_like: f64,
    /// Pressure in hPa
    pub pressure: u32,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Cloud cover percentage
    pub clouds: u8,
    /// Wind speed in the configured units
    pub wind_speed: f64,
    /// Dominant condition, if reported
    pub condition: Option<WeatherCondition>,
}

impl CurrentConditions {
    /// Compact one-line description
    #[must_use]
    pub fn summary(&self) -> String {
        let (emoji, description) = self
            .condition
            .as_ref()
            .map_or(("❓", ""), |c| (c.emoji(), c.description.as_str()));
        format!(
            "{emoji} {description} {} (feels like {}), humidity {}%",
            format_temperature(self.temperature),
            format_temperature(self.feels_like),
            self.humidity
        )
    }
}

/// One hour of forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Start of the hour
    pub time: DateTime<Utc>,
    /// Temperature
    pub temperature: f64,
    /// Apparent temperature
    pub feels_like: f64,
    /// Pressure in hPa
    pub pressure: u32,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Cloud cover percentage
    pub clouds: u8,
    /// Wind speed
    pub wind_speed: f64,
    /// Probability of precipitation (0.0 - 1.0)
    pub precipitation_probability: f64,
    /// Dominant condition, if reported
    pub condition: Option<WeatherCondition>,
}

/// Temperatures over the parts of a day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTemperatures {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// One day of forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Midday of the forecast day
    pub date: DateTime<Utc>,
    /// Temperatures through the day
    pub temperature: DailyTemperatures,
    /// Pressure in hPa
    pub pressure: u32,
    /// Relative humidity percentage
    pub humidity: u8,
    /// Wind speed
    pub wind_speed: f64,
    /// Cloud cover percentage
    pub clouds: u8,
    /// Probability of precipitation (0.0 - 1.0)
    pub precipitation_probability: f64,
    /// Rain volume in mm, if any
    pub rain: Option<f64>,
    /// Maximum UV index
    pub uv_index: f64,
    /// Human-readable summary, if the provider sends one
    pub summary: Option<String>,
    /// Dominant condition, if reported
    pub condition: Option<WeatherCondition>,
}

/// Numeric weather for one coordinate at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Where the weather applies
    pub location: GeoLocation,
    /// Provider timezone name
    pub timezone: String,
    /// When the data was fetched
    pub fetched_at: DateTime<Utc>,
    /// Current conditions
    pub current: CurrentConditions,
    /// Hourly forecast, at most [`WeatherSnapshot::MAX_HOURLY`] entries
    pub hourly: Vec<HourlyForecast>,
    /// Daily forecast, at most [`WeatherSnapshot::MAX_DAILY`] entries
    pub daily: Vec<DailyForecast>,
    /// Textual overview, attached only when that separate fetch succeeded
    pub overview_text: Option<String>,
}

impl WeatherSnapshot {
    /// Maximum hourly entries kept
    pub const MAX_HOURLY: usize = 48;
    /// Maximum daily entries kept
    pub const MAX_DAILY: usize = 8;

    /// Build a snapshot, truncating the forecast series to their caps
    #[must_use]
    pub fn new(
        location: GeoLocation,
        timezone: impl Into<String>,
        current: CurrentConditions,
        mut hourly: Vec<HourlyForecast>,
        mut daily: Vec<DailyForecast>,
    ) -> Self {
        hourly.truncate(Self::MAX_HOURLY);
        daily.truncate(Self::MAX_DAILY);
        Self {
            location,
            timezone: timezone.into(),
            fetched_at: Utc::now(),
            current,
            hourly,
            daily,
            overview_text: None,
        }
    }

    /// Attach the textual overview
    #[must_use]
    pub fn with_overview(mut self, text: impl Into<String>) -> Self {
        self.overview_text = Some(text.into());
        self
    }
}

/// Textual weather overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherOverview {
    /// Date the overview describes (`YYYY-MM-DD`)
    pub date: String,
    /// Overview text
    pub text: String,
}

/// Outcome of the two concurrent weather fetches
///
/// Either half may be missing; neither blocks the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Numeric forecast, with the overview text attached when both succeeded
    pub snapshot: Option<WeatherSnapshot>,
    /// Textual overview on its own
    pub overview: Option<WeatherOverview>,
}

impl WeatherReport {
    /// Combine the results of the two fetches
    #[must_use]
    pub fn combine(snapshot: Option<WeatherSnapshot>, overview: Option<WeatherOverview>) -> Self {
        let snapshot = match (snapshot, &overview) {
            (Some(s), Some(o)) => Some(s.with_overview(o.text.clone())),
            (s, _) => s,
        };
        Self { snapshot, overview }
    }

    /// Overview text, whether or not the numeric forecast arrived
    #[must_use]
    pub fn overview_text(&self) -> Option<&str> {
        self.overview.as_ref().map(|o| o.text.as_str())
    }

    /// Both halves present
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.snapshot.is_some() && self.overview.is_some()
    }

    /// Neither half present
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.snapshot.is_none() && self.overview.is_none()
    }
}

/// Format a temperature rounded to whole degrees
#[must_use]
pub fn format_temperature(value: f64) -> String {
    format!("{}°C", value.round())
}
