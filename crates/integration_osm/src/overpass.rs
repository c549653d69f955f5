//! Overpass POI client
//!
//! Finds OSM elements tagged with a given `amenity` within a radius of a
//! point. The query asks for `out center` so ways and relations come back
//! with a usable position.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use tracing::{debug, instrument};

use crate::config::OverpassConfig;
use crate::error::OsmError;
use crate::models::{OverpassElement, OverpassResponse};

/// An amenity search around a point
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassQuery {
    /// Center latitude
    pub latitude: f64,
    /// Center longitude
    pub longitude: f64,
    /// Search radius in meters
    pub radius_meters: u32,
    /// Value of the `amenity` tag to match
    pub amenity: String,
}

impl OverpassQuery {
    /// Create a new query
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, radius_meters: u32, amenity: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            radius_meters,
            amenity: amenity.into(),
        }
    }

    /// Render the Overpass QL for this query
    #[must_use]
    pub fn to_ql(&self, query_timeout_secs: u32, fetch_limit: u32) -> String {
        format!(
            "[out:json][timeout:{query_timeout_secs}];\n\
             nwr(around:{},{},{})[\"amenity\"=\"{}\"];\n\
             out center {fetch_limit};",
            self.radius_meters, self.latitude, self.longitude, self.amenity
        )
    }

    fn validate(&self) -> Result<(), OsmError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(OsmError::InvalidInput(
                "Coordinates must be finite".to_string(),
            ));
        }
        if self.radius_meters == 0 {
            return Err(OsmError::InvalidInput(
                "Radius must be greater than 0".to_string(),
            ));
        }
        // Tag values are spliced into the query string.
        let valid_tag = !self.amenity.is_empty()
            && self
                .amenity
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_tag {
            return Err(OsmError::InvalidInput(format!(
                "Invalid amenity tag: {:?}",
                self.amenity
            )));
        }
        Ok(())
    }
}

impl fmt::Display for OverpassQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "amenity={} within {}m of {},{}",
            self.amenity, self.radius_meters, self.latitude, self.longitude
        )
    }
}

/// Trait for POI search clients
#[async_trait]
pub trait PoiClient: Send + Sync {
    /// Find elements matching the query, in service order
    async fn find_nearby(&self, query: &OverpassQuery) -> Result<Vec<OverpassElement>, OsmError>;
}

/// Overpass API client
#[derive(Debug)]
pub struct OverpassPoiClient {
    client: Client,
    config: OverpassConfig,
}

impl OverpassPoiClient {
    /// Create a new Overpass client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &OverpassConfig, user_agent: &str) -> Result<Self, OsmError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| OsmError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl PoiClient for OverpassPoiClient {
    #[instrument(skip(self), fields(query = %query))]
    async fn find_nearby(&self, query: &OverpassQuery) -> Result<Vec<OverpassElement>, OsmError> {
        query.validate()?;

        let ql = query.to_ql(self.config.query_timeout_secs, self.config.fetch_limit);
        debug!(%ql, "Querying Overpass");

        let response = self
            .client
            .post(&self.config.base_url)
            .body(ql)
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

        let body = response
            .text()
            .await
            .map_err(|e| OsmError::ConnectionFailed(e.to_string()))?;

        let parsed: OverpassResponse =
            serde_json::from_str(&body).map_err(|e| OsmError::ParseError(e.to_string()))?;

        debug!(count = parsed.elements.len(), "Overpass returned elements");
        Ok(parsed.elements)
    }
}
