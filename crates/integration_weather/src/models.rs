//! Wire models for the OpenWeather One Call 3.0 API
//!
//! Only the fields the application reads are modelled; unknown fields are
//! ignored. Timestamps are Unix seconds.

use serde::{Deserialize, Serialize};

/// Weather condition entry (`weather[]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionData {
    /// Condition id
    pub id: u16,
    /// Group name (Rain, Snow, Clouds, ...)
    pub main: String,
    /// Localized description
    pub description: String,
    /// Icon code
    pub icon: String,
}

/// `current` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentData {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: u32,
    pub humidity: u8,
    #[serde(default)]
    pub clouds: u8,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<ConditionData>,
}

/// One `hourly` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyData {
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: u32,
    pub humidity: u8,
    #[serde(default)]
    pub clouds: u8,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<ConditionData>,
    /// Probability of precipitation (0.0 - 1.0)
    #[serde(default)]
    pub pop: f64,
}

/// Daily temperature breakdown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTemperatureData {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

/// One `daily` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyData {
    pub dt: i64,
    #[serde(default)]
    pub summary: Option<String>,
    pub temp: DailyTemperatureData,
    pub pressure: u32,
    pub humidity: u8,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<ConditionData>,
    #[serde(default)]
    pub clouds: u8,
    #[serde(default)]
    pub pop: f64,
    /// Rain volume in mm
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub uvi: f64,
}

/// Full one-call response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneCallResponse {
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
    pub current: CurrentData,
    #[serde(default)]
    pub hourly: Vec<HourlyData>,
    #[serde(default)]
    pub daily: Vec<DailyData>,
}

/// Overview endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewResponse {
    /// Date the overview covers (`YYYY-MM-DD`)
    pub date: String,
    /// Overview text
    pub weather_overview: String,
}

/// Error body OpenWeather sends with non-2xx answers
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
