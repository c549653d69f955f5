//! Routing adapter - Implements RoutingPort using OSRM

use application::ApplicationError;
use application::ports::{RoutePath, RoutingPort};
use async_trait::async_trait;
use domain::{GeoLocation, Stage};
use integration_osm::{OsrmConfig, OsrmRoutingClient, RoutingClient};
use tracing::{debug, instrument};

use super::map_osm_error;

/// Adapter for driving routes via OSRM
#[derive(Debug)]
pub struct RoutingAdapter<C = OsrmRoutingClient> {
    client: C,
}

impl RoutingAdapter {
    /// Create an adapter backed by an OSRM client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &OsrmConfig, user_agent: &str) -> Result<Self, ApplicationError> {
        let client = OsrmRoutingClient::new(config, user_agent)
            .map_err(|e| map_osm_error(e, Stage::Routing))?;
        Ok(Self { client })
    }
}

impl<C: RoutingClient> RoutingAdapter<C> {
    /// Wrap an existing client
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: RoutingClient> RoutingPort for RoutingAdapter<C> {
    #[instrument(skip(self), fields(origin = %origin, destination = %destination))]
    async fn route(
        &self,
        origin: &GeoLocation,
        destination: &GeoLocation,
    ) -> Result<RoutePath, ApplicationError> {
        let route = self
            .client
            .route(
                (origin.latitude(), origin.longitude()),
                (destination.latitude(), destination.longitude()),
            )
            .await
            .map_err(|e| map_osm_error(e, Stage::Routing))?;

        debug!(distance = route.distance, duration = route.duration, "Route computed");
        Ok(RoutePath {
            geometry: route.geometry,
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}
