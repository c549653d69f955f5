//! Geographic location value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A geographic location with latitude and longitude
///
/// Coordinates are always held in `(latitude, longitude)` order. Services that
/// expect a different axis order convert at their own boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

impl GeoLocation {
    /// Create a new location with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180], or either value is not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates(format!(
                "latitude must be -90 to 90, longitude must be -180 to 180 (got {latitude}, {longitude})"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a location from decimal strings, as returned by Nominatim
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if either string is not a
    /// number or the resulting pair is out of range.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, DomainError> {
        let lat: f64 = latitude.trim().parse().map_err(|_| {
            DomainError::InvalidCoordinates(format!("latitude is not a number: {latitude}"))
        })?;
        let lon: f64 = longitude.trim().parse().map_err(|_| {
            DomainError::InvalidCoordinates(format!("longitude is not a number: {longitude}"))
        })?;
        Self::new(lat, lon)
    }

    /// Create a location without validation (for trusted sources)
    ///
    /// Caller must ensure latitude is in [-90, 90] and longitude in [-180, 180]
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Calculate approximate distance to another location in kilometers
    ///
    /// Uses the Haversine formula for great-circle distance
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lon / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        );
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Distance to another location in meters
    #[must_use]
    pub fn distance_m(&self, other: &Self) -> f64 {
        self.distance_km(other) * 1000.0
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Well-known locations
impl GeoLocation {
    /// Ho Chi Minh City, Vietnam (initial map center)
    #[must_use]
    pub const fn ho_chi_minh_city() -> Self {
        Self::new_unchecked(10.762_486, 106.682_765)
    }

    /// Hanoi, Vietnam
    #[must_use]
    pub const fn hanoi() -> Self {
        Self::new_unchecked(21.0285, 105.8542)
    }
}
