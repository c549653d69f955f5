//! POI discovery port

use async_trait::async_trait;
use domain::{GeoLocation, Poi, PoiCategory};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Parameters of a nearby search
#[derive(Debug, Clone, PartialEq)]
pub struct PoiQuery {
    /// Search center
    pub center: GeoLocation,
    /// Radius around the center in meters
    pub radius_meters: u32,
    /// Amenity category filter
    pub category: PoiCategory,
    /// Maximum results returned
    pub max_results: usize,
}

/// Port for finding points of interest near a coordinate
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PoiDiscoveryPort: Send + Sync {
    /// Find places matching the query, in service order, at most
    /// `query.max_results` of them
    async fn find_nearby(&self, query: &PoiQuery) -> Result<Vec<Poi>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn PoiDiscoveryPort>();
    }
}
