//! Infrastructure adapters
//!
//! Adapters connect application ports to the HTTP integration crates and
//! translate integration errors into stage-tagged application errors.

mod geocoding_adapter;
mod poi_adapter;
mod routing_adapter;
mod weather_adapter;

use application::ApplicationError;
use domain::Stage;
use integration_osm::OsmError;

pub use geocoding_adapter::GeocodingAdapter;
pub use poi_adapter::PoiDiscoveryAdapter;
pub use routing_adapter::RoutingAdapter;
pub use weather_adapter::WeatherAdapter;

/// Map an OSM client error onto the application taxonomy
pub(crate) fn map_osm_error(err: OsmError, stage: Stage) -> ApplicationError {
    match err {
        OsmError::NoRouteFound => ApplicationError::NoRouteFound,
        OsmError::InvalidInput(msg) => ApplicationError::InvalidInput(msg),
        OsmError::ConfigurationError(msg) => ApplicationError::Configuration(msg),
        other => ApplicationError::transport(stage, other.to_string()),
    }
}
