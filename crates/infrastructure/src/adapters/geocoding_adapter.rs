//! Geocoding adapter - Implements GeocodingPort using Nominatim

use application::ApplicationError;
use application::ports::{GeocodeMatch, GeocodingPort};
use async_trait::async_trait;
use domain::{GeoLocation, Stage};
use integration_osm::{GeocodingClient, NominatimConfig, NominatimGeocodingClient};
use tracing::{debug, instrument};

use super::map_osm_error;

/// Adapter for geocoding via Nominatim
#[derive(Debug)]
pub struct GeocodingAdapter<C = NominatimGeocodingClient> {
    client: C,
}

impl GeocodingAdapter {
    /// Create an adapter backed by a Nominatim client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &NominatimConfig) -> Result<Self, ApplicationError> {
        let client = NominatimGeocodingClient::new(config)
            .map_err(|e| map_osm_error(e, Stage::Geocoding))?;
        Ok(Self { client })
    }
}

impl<C: GeocodingClient> GeocodingAdapter<C> {
    /// Wrap an existing client
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: GeocodingClient> GeocodingPort for GeocodingAdapter<C> {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, ApplicationError> {
        let places = self
            .client
            .geocode(query)
            .await
            .map_err(|e| map_osm_error(e, Stage::Geocoding))?;

        let matches = places
            .into_iter()
            .map(|place| {
                let location = GeoLocation::new(place.latitude, place.longitude).map_err(|e| {
                    ApplicationError::transport(Stage::Geocoding, e.to_string())
                })?;
                Ok(GeocodeMatch::new(location, place.display_name))
            })
            .collect::<Result<Vec<_>, ApplicationError>>()?;

        debug!(count = matches.len(), "Geocoded");
        Ok(matches)
    }

    #[instrument(skip(self), fields(location = %location))]
    async fn reverse_geocode(
        &self,
        location: &GeoLocation,
    ) -> Result<Option<String>, ApplicationError> {
        self.client
            .reverse_geocode(location.latitude(), location.longitude())
            .await
            .map_err(|e| map_osm_error(e, Stage::Geocoding))
    }
}
