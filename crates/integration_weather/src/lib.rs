//! OpenWeather integration
//!
//! Client for the OpenWeather One Call 3.0 API
//! (<https://openweathermap.org/api/one-call-3>): the numeric forecast
//! (current, hourly, daily) and the separately served textual overview.
//! Requires an API key.

pub mod client;
mod config;
mod error;
mod models;

pub use client::{OpenWeatherClient, WeatherClient};
pub use config::OpenWeatherConfig;
pub use error::WeatherError;
pub use models::{
    ConditionData, CurrentData, DailyData, DailyTemperatureData, HourlyData, OneCallResponse,
    OverviewResponse,
};
