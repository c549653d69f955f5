//! OpenStreetMap integration for placefinder
//!
//! Three independent HTTP clients, one per public OSM service:
//!
//! - [`NominatimGeocodingClient`]: place names to coordinates and back via
//!   [Nominatim](https://nominatim.openstreetmap.org)
//! - [`OverpassPoiClient`]: amenities around a coordinate via the
//!   [Overpass API](https://overpass-api.de)
//! - [`OsrmRoutingClient`]: driving routes via [OSRM](https://project-osrm.org)
//!
//! Each client makes exactly one request per call and never retries.
//! Coordinates are passed as `(latitude, longitude)` everywhere in this
//! crate's API; the OSRM client swaps to the `lon,lat` order its protocol
//! requires.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_osm::{NominatimConfig, NominatimGeocodingClient, GeocodingClient};
//!
//! let client = NominatimGeocodingClient::new(&NominatimConfig::default())?;
//! let places = client.geocode("Quận 1, TP.HCM").await?;
//! ```

mod config;
mod error;
mod geocoding;
mod models;
mod osrm;
mod overpass;

pub use config::{NominatimConfig, OsrmConfig, OverpassConfig};
pub use error::OsmError;
pub use geocoding::{GeocodingClient, NominatimGeocodingClient};
pub use models::{LatLon, OsrmRoute, OverpassElement, Place};
pub use osrm::{OsrmRoutingClient, RoutingClient};
pub use overpass::{OverpassPoiClient, OverpassQuery, PoiClient};
