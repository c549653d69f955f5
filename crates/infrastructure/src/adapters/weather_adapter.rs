//! Weather adapter - Implements WeatherPort using OpenWeather

use application::ApplicationError;
use application::ports::WeatherPort;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    CurrentConditions, DailyForecast, DailyTemperatures, GeoLocation, HourlyForecast, Stage,
    WeatherCondition, WeatherOverview, WeatherSnapshot,
};
use integration_weather::{
    ConditionData, OneCallResponse, OpenWeatherClient, OpenWeatherConfig, WeatherClient,
    WeatherError,
};
use tracing::{debug, instrument, warn};

/// Adapter for weather via the OpenWeather One Call API
///
/// Without an API key the adapter is built disabled: every call fails with
/// a configuration error, which a search records as unavailable weather.
#[derive(Debug)]
pub struct WeatherAdapter<C = OpenWeatherClient> {
    client: Option<C>,
}

impl WeatherAdapter {
    /// Create an adapter from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a key is present but the configuration is invalid.
    pub fn from_config(config: &OpenWeatherConfig) -> Result<Self, ApplicationError> {
        if !config.has_api_key() {
            warn!("No weather API key configured; weather will be unavailable");
            return Ok(Self { client: None });
        }
        let client = OpenWeatherClient::new(config.clone())
            .map_err(|e| map_error(e, Stage::WeatherForecast))?;
        Ok(Self {
            client: Some(client),
        })
    }
}

impl<C: WeatherClient> WeatherAdapter<C> {
    /// Wrap an existing client
    pub const fn new(client: C) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Whether calls will reach the service
    pub const fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&C, ApplicationError> {
        self.client.as_ref().ok_or_else(|| {
            ApplicationError::Configuration("weather.api_key is not set".to_string())
        })
    }
}

/// Map integration weather error to application error
fn map_error(err: WeatherError, stage: Stage) -> ApplicationError {
    match err {
        WeatherError::InvalidCoordinates => ApplicationError::InvalidInput(err.to_string()),
        WeatherError::ConfigurationError(msg) => ApplicationError::Configuration(msg),
        other => ApplicationError::transport(stage, other.to_string()),
    }
}

fn timestamp(dt: i64) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::from_timestamp(dt, 0).ok_or_else(|| {
        ApplicationError::transport(Stage::WeatherForecast, format!("Invalid timestamp: {dt}"))
    })
}

fn condition(weather: &[ConditionData]) -> Option<WeatherCondition> {
    weather.first().map(|c| WeatherCondition {
        id: c.id,
        main: c.main.clone(),
        description: c.description.clone(),
        icon: c.icon.clone(),
    })
}

/// Convert a one-call response into a domain snapshot for `location`
fn to_snapshot(
    location: GeoLocation,
    response: OneCallResponse,
) -> Result<WeatherSnapshot, ApplicationError> {
    let current = CurrentConditions {
        observed_at: timestamp(response.current.dt)?,
        temperature: response.current.temp,
        feels_like: response.current.feels_like,
        pressure: response.current.pressure,
        humidity: response.current.humidity,
        clouds: response.current.clouds,
        wind_speed: response.current.wind_speed,
        condition: condition(&response.current.weather),
    };

    let hourly = response
        .hourly
        .iter()
        .take(WeatherSnapshot::MAX_HOURLY)
        .map(|h| {
            Ok(HourlyForecast {
                time: timestamp(h.dt)?,
                temperature: h.temp,
                feels_like: h.feels_like,
                pressure: h.pressure,
                humidity: h.humidity,
                clouds: h.clouds,
                wind_speed: h.wind_speed,
                precipitation_probability: h.pop,
                condition: condition(&h.weather),
            })
        })
        .collect::<Result<Vec<_>, ApplicationError>>()?;

    let daily = response
        .daily
        .iter()
        .take(WeatherSnapshot::MAX_DAILY)
        .map(|d| {
            Ok(DailyForecast {
                date: timestamp(d.dt)?,
                temperature: DailyTemperatures {
                    day: d.temp.day,
                    min: d.temp.min,
                    max: d.temp.max,
                    night: d.temp.night,
                    eve: d.temp.eve,
                    morn: d.temp.morn,
                },
                pressure: d.pressure,
                humidity: d.humidity,
                wind_speed: d.wind_speed,
                clouds: d.clouds,
                precipitation_probability: d.pop,
                rain: d.rain,
                uv_index: d.uvi,
                summary: d.summary.clone(),
                condition: condition(&d.weather),
            })
        })
        .collect::<Result<Vec<_>, ApplicationError>>()?;

    Ok(WeatherSnapshot::new(
        location,
        response.timezone,
        current,
        hourly,
        daily,
    ))
}

#[async_trait]
impl<C: WeatherClient> WeatherPort for WeatherAdapter<C> {
    #[instrument(skip(self), fields(location = %location))]
    async fn get_forecast(
        &self,
        location: &GeoLocation,
    ) -> Result<WeatherSnapshot, ApplicationError> {
        let response = self
            .client()?
            .get_forecast(location.latitude(), location.longitude())
            .await
            .map_err(|e| map_error(e, Stage::WeatherForecast))?;

        let snapshot = to_snapshot(*location, response)?;
        debug!(
            hourly = snapshot.hourly.len(),
            daily = snapshot.daily.len(),
            "Weather forecast mapped"
        );
        Ok(snapshot)
    }

    #[instrument(skip(self), fields(location = %location))]
    async fn get_overview(
        &self,
        location: &GeoLocation,
    ) -> Result<WeatherOverview, ApplicationError> {
        let response = self
            .client()?
            .get_overview(location.latitude(), location.longitude())
            .await
            .map_err(|e| map_error(e, Stage::WeatherOverview))?;

        Ok(WeatherOverview {
            date: response.date,
            text: response.weather_overview,
        })
    }
}
