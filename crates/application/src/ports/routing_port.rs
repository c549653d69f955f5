//! Routing port
//!
//! Origin and destination are always `(lat, lon)` here; adapters convert to
//! whatever axis order their protocol needs.

use async_trait::async_trait;
use domain::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::error::ApplicationError;

/// First route returned by the routing service
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    /// GeoJSON geometry of the path
    pub geometry: Value,
    /// Length in meters
    pub distance_meters: f64,
    /// Travel time in seconds
    pub duration_seconds: f64,
}

/// Port for driving routes
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoutingPort: Send + Sync {
    /// Compute a route between two points
    ///
    /// Returns `ApplicationError::NoRouteFound` when the service has no
    /// route between them.
    async fn route(
        &self,
        origin: &GeoLocation,
        destination: &GeoLocation,
    ) -> Result<RoutePath, ApplicationError>;
}
