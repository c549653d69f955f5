//! End-to-end tests wiring the real adapters to mocked upstream services
//!
//! One wiremock server stands in for Nominatim, Overpass, OSRM and
//! OpenWeather; history goes to an in-memory SQLite database.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use application::{
    HistoryStore, RouteWorkflow, SearchOrchestrator, SearchSettings, SessionEvent,
};
use domain::{IssueKind, PoiOutcome, SearchOrigin, SessionStatus, Stage, UserId};
use infrastructure::persistence::{IN_MEMORY, create_pool};
use infrastructure::{
    DatabaseConfig, GeocodingAdapter, PoiDiscoveryAdapter, RoutingAdapter, SqliteHistoryStore,
    WeatherAdapter,
};
use integration_osm::{NominatimConfig, OsrmConfig, OverpassConfig};
use integration_weather::OpenWeatherConfig;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

const USER_AGENT: &str = "placefinder-tests";

fn nominatim_body() -> serde_json::Value {
    json!([{
        "lat": "10.7756587",
        "lon": "106.7004238",
        "display_name": "Quận 1, Thành phố Hồ Chí Minh, Việt Nam"
    }])
}

fn overpass_body() -> serde_json::Value {
    json!({
        "elements": [
            {"type": "node", "id": 1001, "lat": 10.7760, "lon": 106.7010,
             "tags": {"amenity": "cafe", "name": "The Workshop"}},
            {"type": "way", "id": 2002, "center": {"lat": 10.7770, "lon": 106.7020},
             "tags": {"amenity": "cafe"}},
            {"type": "node", "id": 1003, "lat": 10.7750, "lon": 106.6990,
             "tags": {"amenity": "cafe", "name": "Cộng Cà Phê"}}
        ]
    })
}

fn one_call_body() -> serde_json::Value {
    let condition = json!([{"id": 803, "main": "Clouds", "description": "mây cụm", "icon": "04d"}]);
    json!({
        "lat": 10.7757,
        "lon": 106.7004,
        "timezone": "Asia/Ho_Chi_Minh",
        "current": {
            "dt": 1_760_850_000, "temp": 31.4, "feels_like": 37.2, "pressure": 1008,
            "humidity": 66, "clouds": 75, "wind_speed": 3.1, "weather": condition
        },
        "hourly": [{
            "dt": 1_760_853_600, "temp": 30.8, "feels_like": 36.0, "pressure": 1008,
            "humidity": 68, "clouds": 75, "wind_speed": 2.9, "pop": 0.2, "weather": condition
        }],
        "daily": [{
            "dt": 1_760_850_000,
            "summary": "Expect a day of partly cloudy with rain",
            "temp": {"day": 31.0, "min": 25.1, "max": 33.2, "night": 26.0, "eve": 29.0, "morn": 25.5},
            "pressure": 1008, "humidity": 70, "wind_speed": 3.0, "clouds": 60,
            "pop": 0.8, "rain": 4.2, "uvi": 9.3, "weather": condition
        }]
    })
}

fn overview_body() -> serde_json::Value {
    json!({
        "date": "2026-10-19",
        "weather_overview": "Trời nhiều mây, chiều có mưa rào."
    })
}

fn route_body() -> serde_json::Value {
    json!({
        "code": "Ok",
        "routes": [{
            "geometry": {"type": "LineString", "coordinates": [[106.7004, 10.7757], [106.7010, 10.7760]]},
            "distance": 1234.5,
            "duration": 300.0
        }]
    })
}

async fn mount_geocoder(server: &MockServer, body: serde_json::Value, hits: u64) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(hits)
        .mount(server)
        .await;
}

async fn mount_overpass(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .and(body_string_contains("[\"amenity\"=\"cafe\"]"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_call_body()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/3.0/onecall/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(overview_body()))
        .mount(server)
        .await;
}

struct Harness {
    orchestrator: Arc<SearchOrchestrator>,
    history: HistoryStore,
    routes: RouteWorkflow,
}

fn harness(server: &MockServer, weather_key: Option<&str>) -> Harness {
    let uri = server.uri();

    let geocoder = GeocodingAdapter::from_config(&NominatimConfig {
        base_url: uri.clone(),
        ..NominatimConfig::for_testing()
    })
    .expect("geocoder");
    let pois = PoiDiscoveryAdapter::from_config(
        &OverpassConfig {
            base_url: format!("{uri}/api/interpreter"),
            timeout_secs: 5,
            ..OverpassConfig::default()
        },
        USER_AGENT,
    )
    .expect("poi adapter");
    let routing = RoutingAdapter::from_config(
        &OsrmConfig {
            base_url: uri.clone(),
            timeout_secs: 5,
            ..OsrmConfig::default()
        },
        USER_AGENT,
    )
    .expect("routing adapter");
    let weather = WeatherAdapter::from_config(&OpenWeatherConfig {
        base_url: format!("{uri}/data/3.0/onecall"),
        overview_url: format!("{uri}/data/3.0/onecall/overview"),
        api_key: SecretString::from(weather_key.unwrap_or_default().to_string()),
        timeout_secs: 5,
        ..OpenWeatherConfig::default()
    })
    .expect("weather adapter");

    let pool = create_pool(&DatabaseConfig {
        path: IN_MEMORY.to_string(),
        max_connections: 1,
        run_migrations: true,
    })
    .expect("pool");
    let history = HistoryStore::new(Arc::new(SqliteHistoryStore::new(Arc::new(pool))));

    let orchestrator = Arc::new(SearchOrchestrator::new(
        Arc::new(geocoder),
        Arc::new(pois),
        Arc::new(weather),
        history.clone(),
        SearchSettings::default(),
    ));

    Harness {
        orchestrator,
        history,
        routes: RouteWorkflow::new(Arc::new(routing)),
    }
}

fn alice() -> UserId {
    UserId::parse("alice").expect("valid user id")
}

// ============================================================================
// Search Pipeline
// ============================================================================

#[tokio::test]
async fn full_search_resolves_every_stage() {
    let server = MockServer::start().await;
    mount_geocoder(&server, nominatim_body(), 1).await;
    mount_overpass(&server, ResponseTemplate::new(200).set_body_json(overpass_body())).await;
    mount_weather(&server).await;
    let h = harness(&server, Some("test-key"));

    let mut handle = h
        .orchestrator
        .run_search("Quận 1", Some(alice()))
        .expect("search starts");

    let mut events = Vec::new();
    while let Some(update) = handle.next_update().await {
        events.push(update.event);
    }
    assert!(matches!(events.first(), Some(SessionEvent::Started)));
    assert!(matches!(
        events.last(),
        Some(SessionEvent::Completed {
            result_count: Some(3)
        })
    ));

    let session = handle
        .finish()
        .await
        .expect("search ran")
        .into_session()
        .expect("not superseded");

    assert_eq!(session.status(), SessionStatus::Done);
    assert!(!session.is_partial());
    assert_eq!(
        session.display_name(),
        Some("Quận 1, Thành phố Hồ Chí Minh, Việt Nam")
    );
    assert_eq!(session.pois().len(), 3);
    assert_eq!(session.pois()[0].name, "The Workshop");
    assert_eq!(session.pois()[1].name, "Quán cà phê 2");
    assert_eq!(session.pois()[1].id, "way/2002");

    let report = session.weather().expect("weather report");
    assert!(report.is_complete());
    let snapshot = report.snapshot.as_ref().expect("snapshot");
    assert_eq!(snapshot.timezone, "Asia/Ho_Chi_Minh");
    assert_eq!(
        snapshot.overview_text.as_deref(),
        Some("Trời nhiều mây, chiều có mưa rào.")
    );

    let recent = h.history.list_recent(&alice(), 3).await;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].query_text(), "Quận 1");
    assert_eq!(recent[0].result_count(), 3);

    let view = h.orchestrator.view();
    assert_eq!(view.generation, session.generation());
    assert_eq!(view.pois.len(), 3);
}

#[tokio::test]
async fn unknown_place_fails_without_history() {
    let server = MockServer::start().await;
    mount_geocoder(&server, json!([]), 1).await;
    let h = harness(&server, Some("test-key"));

    let outcome = h
        .orchestrator
        .run_search("Atlantis", Some(alice()))
        .expect("search starts")
        .finish()
        .await
        .expect("search ran");
    let session = outcome.session().expect("completed");

    assert_eq!(session.status(), SessionStatus::Failed);
    let failure = session.failure().expect("failure recorded");
    assert_eq!(failure.stage, Stage::Geocoding);
    assert_eq!(failure.kind, IssueKind::NotFound);
    assert!(session.pois().is_empty());
    assert!(h.history.list_recent(&alice(), 3).await.is_empty());
}

#[tokio::test]
async fn geocoder_outage_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let h = harness(&server, Some("test-key"));

    let outcome = h
        .orchestrator
        .run_search("Quận 1", None)
        .expect("search starts")
        .finish()
        .await
        .expect("search ran");
    let failure = outcome
        .session()
        .and_then(|s| s.failure())
        .expect("failure recorded");

    assert_eq!(failure.stage, Stage::Geocoding);
    assert_eq!(failure.kind, IssueKind::Transport);
}

#[tokio::test]
async fn overpass_outage_degrades_to_partial_result() {
    let server = MockServer::start().await;
    mount_geocoder(&server, nominatim_body(), 1).await;
    mount_overpass(&server, ResponseTemplate::new(504)).await;
    mount_weather(&server).await;
    let h = harness(&server, Some("test-key"));

    let session = h
        .orchestrator
        .run_search("Quận 1", Some(alice()))
        .expect("search starts")
        .finish()
        .await
        .expect("search ran")
        .into_session()
        .expect("not superseded");

    assert_eq!(session.status(), SessionStatus::Done);
    assert!(session.is_partial());
    assert_eq!(session.poi_outcome(), PoiOutcome::Failed);
    assert!(
        session
            .advisories()
            .iter()
            .any(|issue| issue.stage == Stage::PoiDiscovery)
    );
    assert!(session.weather().is_some_and(|r| r.is_complete()));
    // POI count unknown, so nothing is recorded
    assert!(h.history.list_recent(&alice(), 3).await.is_empty());
}

#[tokio::test]
async fn missing_weather_key_still_records_history() {
    let server = MockServer::start().await;
    mount_geocoder(&server, nominatim_body(), 1).await;
    mount_overpass(&server, ResponseTemplate::new(200).set_body_json(overpass_body())).await;
    Mock::given(path("/data/3.0/onecall"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let h = harness(&server, None);

    let session = h
        .orchestrator
        .run_search("Quận 1", Some(alice()))
        .expect("search starts")
        .finish()
        .await
        .expect("search ran")
        .into_session()
        .expect("not superseded");

    assert_eq!(session.status(), SessionStatus::Done);
    assert!(session.is_partial());
    let stages: Vec<_> = session.advisories().iter().map(|i| i.stage).collect();
    assert!(stages.contains(&Stage::WeatherForecast));
    assert!(stages.contains(&Stage::WeatherOverview));
    assert!(session.weather().is_some_and(|r| r.is_empty()));

    assert_eq!(h.history.list_recent(&alice(), 3).await.len(), 1);
}

#[tokio::test]
async fn replay_skips_geocoding_and_records_a_new_entry() {
    let server = MockServer::start().await;
    mount_geocoder(&server, nominatim_body(), 1).await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "10.7756587"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lat": "10.7756587",
            "lon": "106.7004238",
            "display_name": "Bến Nghé, Quận 1, Thành phố Hồ Chí Minh"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_overpass(&server, ResponseTemplate::new(200).set_body_json(overpass_body())).await;
    mount_weather(&server).await;
    let h = harness(&server, Some("test-key"));

    h.orchestrator
        .run_search("Quận 1", Some(alice()))
        .expect("search starts")
        .finish()
        .await
        .expect("search ran");
    let recent = h.history.list_recent(&alice(), 3).await;
    let entry = recent.first().expect("entry recorded");

    let session = h
        .orchestrator
        .replay(entry, Some(alice()))
        .finish()
        .await
        .expect("replay ran")
        .into_session()
        .expect("not superseded");

    assert!(matches!(session.origin(), SearchOrigin::History { .. }));
    assert_eq!(session.status(), SessionStatus::Done);
    assert_eq!(session.center(), Some(entry.location()));
    assert_eq!(
        session.display_name(),
        Some("Bến Nghé, Quận 1, Thành phố Hồ Chí Minh")
    );
    assert_eq!(session.pois().len(), 3);

    let after = h.history.list_recent(&alice(), 3).await;
    assert_eq!(after.len(), 2);
    assert_ne!(after[0].id(), entry.id());
    assert_eq!(after[0].location(), entry.location());
    assert_eq!(after[0].query_text(), entry.query_text());
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn route_to_discovered_poi_is_drawn_on_the_view() {
    let server = MockServer::start().await;
    mount_geocoder(&server, nominatim_body(), 1).await;
    mount_overpass(&server, ResponseTemplate::new(200).set_body_json(overpass_body())).await;
    mount_weather(&server).await;
    Mock::given(method("GET"))
        .and(path("/route/v1/driving/106.7004238,10.7756587;106.701,10.776"))
        .and(query_param("geometries", "geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(route_body()))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, Some("test-key"));

    let session = h
        .orchestrator
        .run_search("Quận 1", None)
        .expect("search starts")
        .finish()
        .await
        .expect("search ran")
        .into_session()
        .expect("not superseded");
    let origin = session.center().expect("center");
    let poi = &session.pois()[0];

    let route = h
        .routes
        .compute_route_to(&origin, poi)
        .await
        .expect("route found");
    assert_eq!(route.destination_name, "The Workshop");
    assert_eq!(route.distance_km(), "1.23");
    assert_eq!(route.duration_minutes(), 5);

    assert!(h.orchestrator.show_route(session.generation(), route));
    assert!(h.orchestrator.view().route.is_visible());

    h.orchestrator.clear_route();
    assert!(!h.orchestrator.view().route.is_visible());
}

#[tokio::test]
async fn no_route_is_reported_as_such() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/route/v1/driving/106.7,10.776;106.8,10.9"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"code": "NoRoute", "message": "Impossible route"})),
        )
        .mount(&server)
        .await;
    let h = harness(&server, None);

    let origin = domain::GeoLocation::new(10.776, 106.7).expect("valid");
    let destination = domain::GeoLocation::new(10.9, 106.8).expect("valid");
    let err = h
        .routes
        .compute_route(&origin, &destination, "Somewhere")
        .await
        .unwrap_err();

    assert!(matches!(err, application::ApplicationError::NoRouteFound));
}
