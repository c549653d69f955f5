//! Route entity

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A driving route to a chosen destination
///
/// Always built from exactly one routing response; never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Opaque path geometry (GeoJSON `LineString`, `[lon, lat]` positions)
    pub geometry: Value,
    /// Total length in meters
    pub distance_meters: f64,
    /// Expected travel time in seconds
    pub duration_seconds: f64,
    /// Display name of the destination
    pub destination_name: String,
}

impl RouteResult {
    /// Distance in kilometers, formatted with two decimals
    #[must_use]
    pub fn distance_km(&self) -> String {
        format!("{:.2}", self.distance_meters / 1000.0)
    }

    /// Duration in whole minutes (rounded)
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn duration_minutes(&self) -> u64 {
        (self.duration_seconds.max(0.0) / 60.0).round() as u64
    }

    /// One-line description for a status bar
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Route: {} km, ~{} min to \"{}\"",
            self.distance_km(),
            self.duration_minutes(),
            self.destination_name
        )
    }

    /// Render as a GeoJSON `Feature` for map overlays
    #[must_use]
    pub fn to_geojson_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": self.geometry,
            "properties": {
                "distance": self.distance_meters,
                "distanceKm": self.distance_km(),
                "duration": self.duration_seconds,
                "durationMin": self.duration_minutes(),
                "destination": self.destination_name,
            }
        })
    }
}
