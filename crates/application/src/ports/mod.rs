//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod geocoding_port;
mod history_repository;
mod poi_discovery_port;
mod routing_port;
mod weather_port;

#[cfg(test)]
pub use geocoding_port::MockGeocodingPort;
pub use geocoding_port::{GeocodeMatch, GeocodingPort};
#[cfg(test)]
pub use history_repository::MockHistoryRepository;
pub use history_repository::HistoryRepository;
#[cfg(test)]
pub use poi_discovery_port::MockPoiDiscoveryPort;
pub use poi_discovery_port::{PoiDiscoveryPort, PoiQuery};
#[cfg(test)]
pub use routing_port::MockRoutingPort;
pub use routing_port::{RoutePath, RoutingPort};
#[cfg(test)]
pub use weather_port::MockWeatherPort;
pub use weather_port::WeatherPort;
