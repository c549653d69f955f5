//! Tunables for the search pipeline

use domain::{GeoLocation, PoiCategory};
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Search pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// POI search radius around the center in meters
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,

    /// Amenity category to look for
    #[serde(default)]
    pub category: PoiCategory,

    /// Maximum POIs kept per search
    #[serde(default = "default_max_pois")]
    pub max_pois: usize,

    /// Number of recent searches shown in the history panel
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Map center before any search has resolved
    #[serde(default = "default_center")]
    pub default_center: GeoLocation,

    /// How long the history panel waits before showing an error
    #[serde(default = "default_history_load_timeout")]
    pub history_load_timeout_secs: u64,
}

const fn default_radius_meters() -> u32 {
    500
}

const fn default_max_pois() -> usize {
    5
}

const fn default_history_limit() -> usize {
    3
}

const fn default_center() -> GeoLocation {
    GeoLocation::new_unchecked(10.762_486, 106.682_765)
}

const fn default_history_load_timeout() -> u64 {
    5
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            radius_meters: default_radius_meters(),
            category: PoiCategory::default(),
            max_pois: default_max_pois(),
            history_limit: default_history_limit(),
            default_center: default_center(),
            history_load_timeout_secs: default_history_load_timeout(),
        }
    }
}

impl SearchSettings {
    /// Check the values are usable
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.radius_meters == 0 {
            return Err(ApplicationError::Configuration(
                "search.radius_meters must be greater than 0".to_string(),
            ));
        }
        if self.max_pois == 0 {
            return Err(ApplicationError::Configuration(
                "search.max_pois must be greater than 0".to_string(),
            ));
        }
        if !self.category.is_valid_tag() {
            return Err(ApplicationError::Configuration(format!(
                "search.category is not a valid amenity tag: {:?}",
                self.category.as_tag()
            )));
        }
        GeoLocation::new(
            self.default_center.latitude(),
            self.default_center.longitude(),
        )
        .map_err(|e| ApplicationError::Configuration(format!("search.default_center: {e}")))?;
        Ok(())
    }
}
