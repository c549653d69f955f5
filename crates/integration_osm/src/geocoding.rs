//! Nominatim geocoding client
//!
//! Converts free-form place names to coordinates using the
//! [Nominatim](https://nominatim.openstreetmap.org) API. Successful lookups
//! are cached (24h TTL by default) keyed by the lowercased query.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use tracing::{debug, instrument};

use crate::config::NominatimConfig;
use crate::error::OsmError;
use crate::models::{NominatimPlace, NominatimReverse, Place};

/// Nominatim only hands the first match to callers, so one is enough.
const SEARCH_LIMIT: &str = "1";

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Resolve a free-form query to candidate places, best match first
    ///
    /// An empty list means the service knows no such place.
    async fn geocode(&self, query: &str) -> Result<Vec<Place>, OsmError>;

    /// Resolve coordinates to a display name, if the service has one
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, OsmError>;
}

/// Nominatim-based geocoding client with result caching
#[derive(Debug)]
pub struct NominatimGeocodingClient {
    client: Client,
    config: NominatimConfig,
    cache: Option<Cache<String, Vec<Place>>>,
}

impl NominatimGeocodingClient {
    /// Create a new Nominatim geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, OsmError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| OsmError::ConfigurationError(e.to_string()))?;

        let cache = config.caching_enabled().then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(config.cache_ttl_hours * 3600))
                .build()
        });

        Ok(Self {
            client,
            config: config.clone(),
            cache,
        })
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, OsmError> {
        let url = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| OsmError::from_send(&e, self.config.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok());
            return Err(OsmError::from_status(status, retry_after));
        }

        response
            .text()
            .await
            .map_err(|e| OsmError::ConnectionFailed(e.to_string()))
    }
}

#[async_trait]
impl GeocodingClient for NominatimGeocodingClient {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Vec<Place>, OsmError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(OsmError::InvalidInput(
                "Query must not be empty".to_string(),
            ));
        }

        let cache_key = query.to_lowercase();
        if let Some(cache) = &self.cache {
            if let Some(places) = cache.get(&cache_key).await {
                debug!(%query, "Geocoding cache hit");
                return Ok(places);
            }
        }

        let mut params = vec![
            ("q", query.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
            ("accept-language", self.config.accept_language.clone()),
        ];
        if !self.config.country_filter.is_empty() {
            params.push(("countrycodes", self.config.country_filter.clone()));
        }

        debug!(%query, "Geocoding query");
        let body = self.get("search", &params).await?;

        let raw: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| OsmError::ParseError(e.to_string()))?;

        let places = raw
            .into_iter()
            .map(|place| {
                let latitude = place
                    .lat
                    .parse()
                    .map_err(|_| OsmError::ParseError(format!("Invalid latitude: {}", place.lat)))?;
                let longitude = place
                    .lon
                    .parse()
                    .map_err(|_| OsmError::ParseError(format!("Invalid longitude: {}", place.lon)))?;
                Ok(Place {
                    latitude,
                    longitude,
                    display_name: place.display_name,
                })
            })
            .collect::<Result<Vec<_>, OsmError>>()?;

        debug!(%query, count = places.len(), "Geocoded query");

        // Misses are not cached; a place may be added upstream later.
        if let Some(cache) = &self.cache {
            if !places.is_empty() {
                cache.insert(cache_key, places.clone()).await;
            }
        }

        Ok(places)
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, OsmError> {
        let params = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "jsonv2".to_string()),
            ("accept-language", self.config.accept_language.clone()),
        ];

        debug!(%latitude, %longitude, "Reverse geocoding");
        let body = self.get("reverse", &params).await?;

        let result: NominatimReverse =
            serde_json::from_str(&body).map_err(|e| OsmError::ParseError(e.to_string()))?;

        if let Some(error) = result.error {
            debug!(%error, "Reverse geocoding returned no place");
            return Ok(None);
        }
        Ok(result.display_name)
    }
}
