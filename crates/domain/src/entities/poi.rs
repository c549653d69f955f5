//! Point of interest entity

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::{GeoLocation, PoiCategory};

/// A place discovered near a search center
///
/// Value object with no back-references; a result set keeps the order the
/// discovery service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    /// Source identifier (OSM element id, or a positional fallback)
    pub id: String,
    /// Human-readable name, synthesized from the category when missing
    pub name: String,
    /// Where the place is
    pub position: GeoLocation,
    /// Category it was discovered under
    pub category: PoiCategory,
    /// Source element type (`node`, `way`, `relation`)
    pub element_type: String,
    /// Raw descriptive tags
    pub tags: BTreeMap<String, String>,
}

impl Poi {
    /// Contact phone number, if tagged
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.tags
            .get("phone")
            .or_else(|| self.tags.get("contact:phone"))
            .map(String::as_str)
    }

    /// Website, if tagged
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.tags
            .get("website")
            .or_else(|| self.tags.get("contact:website"))
            .map(String::as_str)
    }

    /// Opening hours, if tagged
    #[must_use]
    pub fn opening_hours(&self) -> Option<&str> {
        self.tags.get("opening_hours").map(String::as_str)
    }

    /// Straight-line distance from `origin` in meters
    #[must_use]
    pub fn distance_from(&self, origin: &GeoLocation) -> f64 {
        origin.distance_m(&self.position)
    }
}
