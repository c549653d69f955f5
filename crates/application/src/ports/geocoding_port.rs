//! Geocoding port
//!
//! Resolves free-text place names to coordinates.

use async_trait::async_trait;
use domain::GeoLocation;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// One geocoder candidate, in service order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeMatch {
    /// Resolved coordinates
    pub location: GeoLocation,
    /// Full display name, when the service provides one
    pub display_name: Option<String>,
}

impl GeocodeMatch {
    #[must_use]
    pub const fn new(location: GeoLocation, display_name: Option<String>) -> Self {
        Self {
            location,
            display_name,
        }
    }
}

/// Port for geocoding operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Resolve a place name to candidate locations
    ///
    /// An empty list means the service knows no such place. Transport
    /// failures are returned as `ApplicationError::Transport` tagged with
    /// `Stage::Geocoding`.
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, ApplicationError>;

    /// Find a display name for a coordinate
    async fn reverse_geocode(
        &self,
        location: &GeoLocation,
    ) -> Result<Option<String>, ApplicationError>;
}
