//! Route workflow
//!
//! Computes a driving route to a selected POI. Independent of any search
//! session: each call is one request and one response, and concurrent calls
//! share nothing mutable.

use std::sync::Arc;

use domain::{GeoLocation, Poi, RouteResult, Stage};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::RoutingPort;

/// Computes routes through a [`RoutingPort`]
#[derive(Clone)]
pub struct RouteWorkflow {
    routing: Arc<dyn RoutingPort>,
}

impl std::fmt::Debug for RouteWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteWorkflow").finish_non_exhaustive()
    }
}

impl RouteWorkflow {
    #[must_use]
    pub fn new(routing: Arc<dyn RoutingPort>) -> Self {
        Self { routing }
    }

    /// Route from `origin` to `destination`
    ///
    /// # Errors
    ///
    /// `NoRouteFound` when the service has no route, otherwise a transport
    /// error tagged with `Stage::Routing`. Nothing is retried.
    #[instrument(
        skip(self, origin, destination),
        fields(origin = %origin, destination = %destination)
    )]
    pub async fn compute_route(
        &self,
        origin: &GeoLocation,
        destination: &GeoLocation,
        destination_name: &str,
    ) -> Result<RouteResult, ApplicationError> {
        let path = self
            .routing
            .route(origin, destination)
            .await
            .map_err(|e| {
                warn!(error = %e, "Route request failed");
                e.tagged(Stage::Routing)
            })?;

        if !path.distance_meters.is_finite() || !path.duration_seconds.is_finite() {
            return Err(ApplicationError::transport(
                Stage::Routing,
                "route has no usable distance or duration",
            ));
        }

        let route = RouteResult {
            geometry: path.geometry,
            distance_meters: path.distance_meters,
            duration_seconds: path.duration_seconds,
            destination_name: destination_name.to_string(),
        };
        debug!(summary = %route.summary(), "Route computed");
        Ok(route)
    }

    /// Route from `origin` to a discovered POI
    pub async fn compute_route_to(
        &self,
        origin: &GeoLocation,
        poi: &Poi,
    ) -> Result<RouteResult, ApplicationError> {
        self.compute_route(origin, &poi.position, &poi.name).await
    }
}

/// The route currently drawn on the map, if any
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOverlay {
    route: Option<RouteResult>,
}

impl RouteOverlay {
    /// Replace whatever was shown
    pub fn show(&mut self, route: RouteResult) {
        self.route = Some(route);
    }

    pub fn clear(&mut self) {
        self.route = None;
    }

    #[must_use]
    pub const fn current(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.route.is_some()
    }
}
