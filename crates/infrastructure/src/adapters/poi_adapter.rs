//! POI discovery adapter - Implements PoiDiscoveryPort using Overpass

use application::ApplicationError;
use application::ports::{PoiDiscoveryPort, PoiQuery};
use async_trait::async_trait;
use domain::{GeoLocation, Poi, PoiCategory, Stage};
use integration_osm::{OverpassConfig, OverpassElement, OverpassPoiClient, OverpassQuery, PoiClient};
use tracing::{debug, instrument};

use super::map_osm_error;

/// Adapter for POI discovery via the Overpass API
#[derive(Debug)]
pub struct PoiDiscoveryAdapter<C = OverpassPoiClient> {
    client: C,
}

impl PoiDiscoveryAdapter {
    /// Create an adapter backed by an Overpass client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &OverpassConfig, user_agent: &str) -> Result<Self, ApplicationError> {
        let client = OverpassPoiClient::new(config, user_agent)
            .map_err(|e| map_osm_error(e, Stage::PoiDiscovery))?;
        Ok(Self { client })
    }
}

impl<C: PoiClient> PoiDiscoveryAdapter<C> {
    /// Wrap an existing client
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

/// Turn service elements into POIs, keeping service order
///
/// Elements without a usable position are dropped before the cap is applied;
/// unnamed ones get `"<category label> <n>"` where `n` is their 1-based
/// position in the result.
fn to_pois(elements: Vec<OverpassElement>, category: &PoiCategory, max_results: usize) -> Vec<Poi> {
    elements
        .into_iter()
        .filter_map(|element| {
            let position = element.position()?;
            let location = GeoLocation::new(position.lat, position.lon).ok()?;
            Some((element, location))
        })
        .take(max_results)
        .enumerate()
        .map(|(index, (element, position))| {
            let name = element
                .name()
                .map_or_else(|| category.fallback_name(index + 1), str::to_string);
            let id = element.id.map_or_else(
                || format!("poi_{index}"),
                |id| format!("{}/{id}", element.element_type),
            );
            Poi {
                id,
                name,
                position,
                category: category.clone(),
                element_type: element.element_type,
                tags: element.tags,
            }
        })
        .collect()
}

#[async_trait]
impl<C: PoiClient> PoiDiscoveryPort for PoiDiscoveryAdapter<C> {
    #[instrument(skip(self, query), fields(center = %query.center, category = %query.category, radius = query.radius_meters))]
    async fn find_nearby(&self, query: &PoiQuery) -> Result<Vec<Poi>, ApplicationError> {
        let overpass_query = OverpassQuery::new(
            query.center.latitude(),
            query.center.longitude(),
            query.radius_meters,
            query.category.as_tag(),
        );

        let elements = self
            .client
            .find_nearby(&overpass_query)
            .await
            .map_err(|e| map_osm_error(e, Stage::PoiDiscovery))?;

        let pois = to_pois(elements, &query.category, query.max_results);
        debug!(count = pois.len(), "Discovered POIs");
        Ok(pois)
    }
}
