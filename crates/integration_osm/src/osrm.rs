//! OSRM routing client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::config::OsrmConfig;
use crate::error::OsmError;
use crate::models::{OsrmResponse, OsrmRoute};

/// OSRM answer code when the points are not connected
const NO_ROUTE: &str = "NoRoute";

/// Trait for routing clients
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Compute the best route between two points given as `(lat, lon)`
    ///
    /// Returns [`OsmError::NoRouteFound`] when the service finds none.
    async fn route(
        &self,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<OsrmRoute, OsmError>;
}

/// OSRM HTTP client
#[derive(Debug)]
pub struct OsrmRoutingClient {
    client: Client,
    config: OsrmConfig,
}

impl OsrmRoutingClient {
    /// Create a new OSRM client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &OsrmConfig, user_agent: &str) -> Result<Self, OsmError> {
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

    /// Build the route URL; OSRM wants `lon,lat` pairs
    fn route_url(&self, from: (f64, f64), to: (f64, f64)) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.1,
            from.0,
            to.1,
            to.0
        )
    }
}

#[async_trait]
impl RoutingClient for OsrmRoutingClient {
    #[instrument(skip(self))]
    async fn route(
        &self,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<OsrmRoute, OsmError> {
        if ![from.0, from.1, to.0, to.1].iter().all(|v| v.is_finite()) {
            return Err(OsmError::InvalidInput(
                "Coordinates must be finite".to_string(),
            ));
        }

        let url = self.route_url(from, to);
        debug!(%url, "Requesting route");

        let response = self
            .client
            .get(&url)
            .query(&[("geometries", "geojson"), ("overview", "full")])
            .send()
            .await
            .map_err(|e| OsmError::from_send(&e, self.config.timeout_secs))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OsmError::ConnectionFailed(e.to_string()))?;

        // OSRM reports unroutable input as 400 with a JSON code.
        if !status.is_success() {
            if status == StatusCode::BAD_REQUEST {
                if let Ok(parsed) = serde_json::from_str::<OsrmResponse>(&body) {
                    if parsed.code == NO_ROUTE {
                        return Err(OsmError::NoRouteFound);
                    }
                    return Err(OsmError::RequestFailed(format!(
                        "{}: {}",
                        parsed.code,
                        parsed.message.unwrap_or_default()
                    )));
                }
            }
            return Err(OsmError::from_status(status, None));
        }

        let parsed: OsrmResponse =
            serde_json::from_str(&body).map_err(|e| OsmError::ParseError(e.to_string()))?;

        if parsed.code == NO_ROUTE {
            return Err(OsmError::NoRouteFound);
        }
        if parsed.code != "Ok" {
            return Err(OsmError::RequestFailed(format!(
                "{}: {}",
                parsed.code,
                parsed.message.unwrap_or_default()
            )));
        }

        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or(OsmError::NoRouteFound)?;

        debug!(distance = route.distance, duration = route.duration, "Route found");
        Ok(route)
    }
}
