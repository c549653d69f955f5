//! Wire models for the OSM services

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Human-readable name as returned by the service
    pub display_name: Option<String>,
}

/// Raw Nominatim search result (`format=jsonv2`)
///
/// Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Raw Nominatim reverse result
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NominatimReverse {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A plain coordinate pair in Overpass responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

/// A node, way or relation returned by Overpass
///
/// Nodes carry `lat`/`lon` directly; ways and relations carry a computed
/// `center` when the query asks for `out center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverpassElement {
    /// OSM element id
    #[serde(default)]
    pub id: Option<i64>,
    /// `node`, `way` or `relation`
    #[serde(rename = "type", default)]
    pub element_type: String,
    /// Node latitude
    #[serde(default)]
    pub lat: Option<f64>,
    /// Node longitude
    #[serde(default)]
    pub lon: Option<f64>,
    /// Center of a way or relation
    #[serde(default)]
    pub center: Option<LatLon>,
    /// OSM tags
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl OverpassElement {
    /// Position of the element, preferring the computed center
    #[must_use]
    pub fn position(&self) -> Option<LatLon> {
        self.center.or_else(|| match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(LatLon { lat, lon }),
            _ => None,
        })
    }

    /// The `name` tag, if present and not blank
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.tags
            .get("name")
            .map(String::as_str)
            .filter(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// A single route returned by OSRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsrmRoute {
    /// GeoJSON `LineString` geometry
    pub geometry: serde_json::Value,
    /// Length in meters
    pub distance: f64,
    /// Travel time in seconds
    pub duration: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}
