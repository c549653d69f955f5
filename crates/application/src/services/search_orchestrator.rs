//! Search orchestrator
//!
//! Drives one search through geocoding, POI discovery and weather, keeps the
//! shared [`SessionView`] current and records finished searches in history.
//!
//! Every search is stamped with a generation number. Only the newest
//! generation may write the view or emit updates; an older search notices at
//! its next step and stops without touching anything. The network call it
//! was waiting on is not cancelled, its result is just dropped.
//!
//! Failure policy:
//! - geocoding finding nothing, or failing, ends the search in `failed`
//! - POI discovery failing is advisory; weather is still fetched
//! - forecast and overview are fetched concurrently and fail independently
//! - history writes never affect the search

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use domain::{
    DomainError, GeoLocation, HistoryEntry, PoiOutcome, RouteResult, SearchOrigin, SearchSession,
    SessionIssue, Stage, UserId, WeatherReport,
};
use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::error::ApplicationError;
use crate::ports::{GeocodingPort, PoiDiscoveryPort, PoiQuery, WeatherPort};
use crate::services::history_store::HistoryStore;
use crate::services::session_view::{SessionEvent, SessionUpdate, SessionView};
use crate::settings::SearchSettings;

/// Capacity of a search's update stream
const UPDATE_BUFFER: usize = 32;

/// How a search ended
#[derive(Debug)]
pub enum SearchOutcome {
    /// Reached `done` or `failed`
    Completed(SearchSession),
    /// A newer search started first; nothing more was shown
    Superseded { generation: u64 },
}

impl SearchOutcome {
    #[must_use]
    pub const fn session(&self) -> Option<&SearchSession> {
        match self {
            Self::Completed(session) => Some(session),
            Self::Superseded { .. } => None,
        }
    }

    #[must_use]
    pub fn into_session(self) -> Option<SearchSession> {
        match self {
            Self::Completed(session) => Some(session),
            Self::Superseded { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

/// A running search
///
/// Yields [`SessionUpdate`]s as a [`Stream`]; the stream ends when the
/// search finishes or is superseded.
#[derive(Debug)]
pub struct SearchHandle {
    generation: u64,
    updates: mpsc::Receiver<SessionUpdate>,
    task: JoinHandle<Result<SearchOutcome, ApplicationError>>,
}

impl SearchHandle {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Next update, or `None` once the search is over
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        self.updates.recv().await
    }

    /// Wait for the search to end, discarding updates not yet read
    pub async fn finish(self) -> Result<SearchOutcome, ApplicationError> {
        let Self { task, updates, .. } = self;
        drop(updates);
        task.await
            .map_err(|e| ApplicationError::Internal(format!("search task failed: {e}")))?
    }
}

impl Stream for SearchHandle {
    type Item = SessionUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.updates.poll_recv(cx)
    }
}

/// Why a search stopped early
enum Halt {
    Superseded,
    Failed(ApplicationError),
}

impl From<DomainError> for Halt {
    fn from(err: DomainError) -> Self {
        Self::Failed(err.into())
    }
}

type Updates = mpsc::Sender<SessionUpdate>;

/// Runs searches and owns the shared session view
pub struct SearchOrchestrator {
    geocoder: Arc<dyn GeocodingPort>,
    poi_discovery: Arc<dyn PoiDiscoveryPort>,
    weather: Arc<dyn WeatherPort>,
    history: HistoryStore,
    settings: SearchSettings,
    generation: AtomicU64,
    view: watch::Sender<SessionView>,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("settings", &self.settings)
            .field("generation", &self.current_generation())
            .finish_non_exhaustive()
    }
}

impl SearchOrchestrator {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn GeocodingPort>,
        poi_discovery: Arc<dyn PoiDiscoveryPort>,
        weather: Arc<dyn WeatherPort>,
        history: HistoryStore,
        settings: SearchSettings,
    ) -> Self {
        let (view, _) = watch::channel(SessionView::initial(settings.default_center));
        Self {
            geocoder,
            poi_discovery,
            weather,
            history,
            settings,
            generation: AtomicU64::new(0),
            view,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Generation of the newest search (0 before the first)
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Watch the shared view
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    /// Snapshot of the shared view
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Start a search for `query_text`, superseding any search in flight
    ///
    /// When `user_id` is given and POI discovery succeeds, the search is
    /// recorded in that user's history.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the query is blank. No generation is used
    /// up in that case.
    pub fn run_search(
        self: &Arc<Self>,
        query_text: &str,
        user_id: Option<UserId>,
    ) -> Result<SearchHandle, ApplicationError> {
        if query_text.trim().is_empty() {
            return Err(DomainError::EmptyQuery.into());
        }
        let session = SearchSession::new(query_text, self.next_generation())?;
        Ok(self.start(session, user_id))
    }

    /// Re-run a past search at its stored coordinates, without geocoding
    ///
    /// A replay is a new search: with `user_id` it gets its own history
    /// entry under the same rules as a typed query.
    pub fn replay(self: &Arc<Self>, entry: &HistoryEntry, user_id: Option<UserId>) -> SearchHandle {
        let session = SearchSession::replay(
            entry.query_text(),
            self.next_generation(),
            entry.id(),
            entry.location(),
        );
        self.start(session, user_id)
    }

    /// Draw `route` if it belongs to the newest search
    pub fn show_route(&self, generation: u64, route: RouteResult) -> bool {
        self.view.send_if_modified(|view| {
            if view.generation != generation || !self.is_current(generation) {
                return false;
            }
            view.route.show(route);
            true
        })
    }

    /// Remove the drawn route
    pub fn clear_route(&self) {
        self.view.send_if_modified(|view| {
            let visible = view.route.is_visible();
            view.route.clear();
            visible
        });
    }

    fn start(self: &Arc<Self>, session: SearchSession, user_id: Option<UserId>) -> SearchHandle {
        let generation = session.generation();
        self.view.send_if_modified(|view| {
            if generation < view.generation || !self.is_current(generation) {
                return false;
            }
            view.begin(&session);
            true
        });

        let span = info_span!("search", generation, query = %session.query_text());
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.drive(session, user_id, tx).await }.instrument(span));

        SearchHandle {
            generation,
            updates: rx,
            task,
        }
    }

    async fn drive(
        &self,
        mut session: SearchSession,
        user_id: Option<UserId>,
        updates: Updates,
    ) -> Result<SearchOutcome, ApplicationError> {
        let generation = session.generation();
        match self.run_stages(&mut session, &updates).await {
            Ok(()) => {},
            Err(Halt::Superseded) => {
                debug!(
                    generation,
                    current = self.current_generation(),
                    "Search superseded, stopping"
                );
                return Ok(SearchOutcome::Superseded { generation });
            },
            Err(Halt::Failed(e)) => return Err(e),
        }
        drop(updates);

        info!(status = %session.status(), message = session.status_message(), "Search finished");
        self.record_history(&session, user_id).await;
        Ok(SearchOutcome::Completed(session))
    }

    async fn run_stages(&self, session: &mut SearchSession, updates: &Updates) -> Result<(), Halt> {
        let center = match session.origin() {
            SearchOrigin::Query => match self.geocode(session, updates).await? {
                Some(center) => center,
                None => return Ok(()),
            },
            SearchOrigin::History { .. } => self.resume_at_stored_center(session, updates).await?,
        };

        self.discover_pois(session, center, updates).await?;
        self.fetch_weather(session, center, updates).await?;

        session.complete()?;
        let result_count = match session.poi_outcome() {
            PoiOutcome::Found { count } => Some(count),
            PoiOutcome::Pending | PoiOutcome::Failed => None,
        };
        self.publish(session, SessionEvent::Completed { result_count }, updates)
            .await
    }

    /// Resolve the center; `None` means the search ended in `failed`
    async fn geocode(
        &self,
        session: &mut SearchSession,
        updates: &Updates,
    ) -> Result<Option<GeoLocation>, Halt> {
        session.begin_geocoding()?;
        self.publish(session, SessionEvent::Started, updates).await?;

        let result = self.geocoder.geocode(session.query_text()).await;
        self.ensure_current(session.generation())?;

        let first = match result {
            Ok(matches) => matches.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "Geocoding failed");
                self.fail(session, e.to_issue(Stage::Geocoding), updates)
                    .await?;
                return Ok(None);
            },
        };

        let Some(first) = first else {
            info!("Location not found");
            let issue = ApplicationError::LocationNotFound(session.query_text().to_string())
                .to_issue(Stage::Geocoding);
            self.fail(session, issue, updates).await?;
            return Ok(None);
        };

        debug!(center = %first.location, "Center resolved");
        session.locate(first.location, first.display_name.clone())?;
        self.publish(
            session,
            SessionEvent::CenterResolved {
                center: first.location,
                display_name: first.display_name,
            },
            updates,
        )
        .await?;
        Ok(Some(first.location))
    }

    /// Use a replay's stored center, naming it by reverse geocoding
    ///
    /// History keeps only the query text, so the place name is looked up
    /// again. Failing to find one is not an issue for the search.
    async fn resume_at_stored_center(
        &self,
        session: &mut SearchSession,
        updates: &Updates,
    ) -> Result<GeoLocation, Halt> {
        let center = session.center().ok_or_else(|| {
            Halt::Failed(ApplicationError::Internal(
                "history replay without a center".to_string(),
            ))
        })?;

        let name = self.geocoder.reverse_geocode(&center).await;
        self.ensure_current(session.generation())?;
        match name {
            Ok(Some(name)) => session.name_center(name)?,
            Ok(None) => debug!(%center, "No place name for stored center"),
            Err(e) => debug!(error = %e, "Reverse geocoding failed, replaying unnamed"),
        }

        let display_name = session.display_name().map(str::to_string);
        self.publish(
            session,
            SessionEvent::CenterResolved {
                center,
                display_name,
            },
            updates,
        )
        .await?;
        Ok(center)
    }

    async fn discover_pois(
        &self,
        session: &mut SearchSession,
        center: GeoLocation,
        updates: &Updates,
    ) -> Result<(), Halt> {
        session.begin_poi_discovery(self.settings.category.clone())?;
        self.publish(session, SessionEvent::DiscoveringPois, updates)
            .await?;

        let query = PoiQuery {
            center,
            radius_meters: self.settings.radius_meters,
            category: self.settings.category.clone(),
            max_results: self.settings.max_pois,
        };
        let result = self.poi_discovery.find_nearby(&query).await;
        self.ensure_current(session.generation())?;

        match result {
            Ok(mut pois) => {
                pois.truncate(self.settings.max_pois);
                debug!(count = pois.len(), "POIs discovered");
                session.record_pois(pois)?;
                let pois = session.pois().to_vec();
                self.publish(session, SessionEvent::PoisDiscovered { pois }, updates)
                    .await
            },
            Err(e) => {
                warn!(error = %e, "POI discovery failed, continuing without POIs");
                let issue = SessionIssue::partial(Stage::PoiDiscovery, e.to_string());
                session.record_poi_failure(issue.clone())?;
                self.publish(session, SessionEvent::PoiDiscoveryFailed { issue }, updates)
                    .await
            },
        }
    }

    async fn fetch_weather(
        &self,
        session: &mut SearchSession,
        center: GeoLocation,
        updates: &Updates,
    ) -> Result<(), Halt> {
        session.begin_weather()?;
        self.publish(session, SessionEvent::FetchingWeather, updates)
            .await?;

        let (forecast, overview) = tokio::join!(
            self.weather.get_forecast(&center),
            self.weather.get_overview(&center)
        );
        self.ensure_current(session.generation())?;

        let mut issues = Vec::new();
        let snapshot = forecast
            .map_err(|e| {
                warn!(error = %e, "Weather forecast unavailable");
                issues.push(SessionIssue::partial(Stage::WeatherForecast, e.to_string()));
            })
            .ok();
        let overview = overview
            .map_err(|e| {
                warn!(error = %e, "Weather overview unavailable");
                issues.push(SessionIssue::partial(Stage::WeatherOverview, e.to_string()));
            })
            .ok();

        let report = WeatherReport::combine(snapshot, overview);
        session.record_weather(report.clone(), issues.clone())?;
        self.publish(session, SessionEvent::WeatherResolved { report, issues }, updates)
            .await
    }

    async fn fail(
        &self,
        session: &mut SearchSession,
        issue: SessionIssue,
        updates: &Updates,
    ) -> Result<(), Halt> {
        session.fail(issue.clone())?;
        self.publish(session, SessionEvent::Failed { issue }, updates)
            .await
    }

    /// Record a finished search, only when the POI count is known
    ///
    /// A search that reached `done` is recorded even if a newer one started
    /// since; it was current for every stage it ran.
    async fn record_history(&self, session: &SearchSession, user_id: Option<UserId>) {
        let Some(user_id) = user_id else {
            return;
        };
        let (PoiOutcome::Found { count }, Some(center)) = (session.poi_outcome(), session.center())
        else {
            debug!("POI count unknown, not recording history");
            return;
        };

        let result_count = u32::try_from(count).unwrap_or(u32::MAX);
        let entry = HistoryEntry::new(user_id, session.query_text(), center, result_count);
        self.history.append(&entry).await;
    }

    fn ensure_current(&self, generation: u64) -> Result<(), Halt> {
        if self.is_current(generation) {
            Ok(())
        } else {
            Err(Halt::Superseded)
        }
    }

    /// Apply the session to the view and emit `event`, unless superseded
    async fn publish(
        &self,
        session: &SearchSession,
        event: SessionEvent,
        updates: &Updates,
    ) -> Result<(), Halt> {
        let generation = session.generation();
        let applied = self.view.send_if_modified(|view| {
            if view.generation > generation || !self.is_current(generation) {
                return false;
            }
            view.sync(session);
            true
        });
        if !applied {
            return Err(Halt::Superseded);
        }

        if updates
            .send(SessionUpdate::new(session, event))
            .await
            .is_err()
        {
            debug!(generation, "Update receiver dropped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use domain::{
        CurrentConditions, HistoryEntryId, IssueKind, Poi, PoiCategory, SessionStatus,
        WeatherOverview, WeatherSnapshot,
    };
    use futures::StreamExt;
    use serde_json::json;
    use tokio::sync::{Barrier, Notify};

    use super::*;
    use crate::ports::{
        GeocodeMatch, HistoryRepository, MockGeocodingPort, MockHistoryRepository,
        MockPoiDiscoveryPort, MockWeatherPort,
    };

    fn quan_1() -> GeoLocation {
        GeoLocation::parse("10.776", "106.700").unwrap()
    }

    fn user() -> UserId {
        UserId::parse("user-42").unwrap()
    }

    fn cafe(n: usize) -> Poi {
        Poi {
            id: format!("node/{n}"),
            name: format!("Cafe {n}"),
            position: GeoLocation::new(10.776 + 0.001 * n as f64, 106.7).unwrap(),
            category: PoiCategory::Cafe,
            element_type: "node".to_string(),
            tags: BTreeMap::new(),
        }
    }

    fn snapshot(location: GeoLocation) -> WeatherSnapshot {
        WeatherSnapshot::new(
            location,
            "Asia/Ho_Chi_Minh",
            CurrentConditions {
                observed_at: Utc::now(),
                temperature: 31.0,
                feels_like: 35.0,
                pressure: 1008,
                humidity: 70,
                clouds: 40,
                wind_speed: 3.0,
                condition: None,
            },
            vec![],
            vec![],
        )
    }

    fn overview() -> WeatherOverview {
        WeatherOverview {
            date: "2026-10-19".to_string(),
            text: "Trời nhiều mây, có mưa rào".to_string(),
        }
    }

    fn geocoder_at(location: GeoLocation) -> MockGeocodingPort {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_geocode().times(1).returning(move |_| {
            Ok(vec![GeocodeMatch::new(
                location,
                Some("Quận 1, Thành phố Hồ Chí Minh".to_string()),
            )])
        });
        geocoder
    }

    fn pois_returning(count: usize) -> MockPoiDiscoveryPort {
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby()
            .times(1)
            .returning(move |_| Ok((1..=count).map(cafe).collect()));
        pois
    }

    fn weather_for(searches: usize) -> MockWeatherPort {
        let mut weather = MockWeatherPort::new();
        weather
            .expect_get_forecast()
            .times(searches)
            .returning(|location| Ok(snapshot(*location)));
        weather
            .expect_get_overview()
            .times(searches)
            .returning(|_| Ok(overview()));
        weather
    }

    fn working_weather() -> MockWeatherPort {
        weather_for(1)
    }

    fn orchestrator(
        geocoder: impl GeocodingPort + 'static,
        pois: impl PoiDiscoveryPort + 'static,
        weather: impl WeatherPort + 'static,
        history: MockHistoryRepository,
    ) -> Arc<SearchOrchestrator> {
        Arc::new(SearchOrchestrator::new(
            Arc::new(geocoder),
            Arc::new(pois),
            Arc::new(weather),
            HistoryStore::new(Arc::new(history)),
            SearchSettings::default(),
        ))
    }

    async fn run_to_end(mut handle: SearchHandle) -> (Vec<SessionUpdate>, SearchOutcome) {
        let mut updates = Vec::new();
        while let Some(update) = handle.next().await {
            updates.push(update);
        }
        let outcome = handle.finish().await.unwrap();
        (updates, outcome)
    }

    fn position(updates: &[SessionUpdate], pred: impl Fn(&SessionEvent) -> bool) -> Option<usize> {
        updates.iter().position(|u| pred(&u.event))
    }

    #[tokio::test]
    async fn full_search_reaches_done_and_records_history() {
        let mut history = MockHistoryRepository::new();
        history
            .expect_append()
            .times(1)
            .withf(|entry| {
                entry.result_count() == 3
                    && entry.query_text() == "Quận 1, TP.HCM"
                    && entry.location() == GeoLocation::new_unchecked(10.776, 106.7)
            })
            .returning(|_| Ok(()));
        let orchestrator =
            orchestrator(geocoder_at(quan_1()), pois_returning(3), working_weather(), history);

        let handle = orchestrator
            .run_search("Quận 1, TP.HCM", Some(user()))
            .unwrap();
        let (updates, outcome) = run_to_end(handle).await;

        let session = outcome.into_session().unwrap();
        assert_eq!(session.status(), SessionStatus::Done);
        assert_eq!(session.center(), Some(GeoLocation::new_unchecked(10.776, 106.7)));
        assert_eq!(session.pois().len(), 3);
        assert!(session.weather().unwrap().is_complete());
        assert!(!session.is_partial());

        let center_at =
            position(&updates, |e| matches!(e, SessionEvent::CenterResolved { .. })).unwrap();
        let pois_at =
            position(&updates, |e| matches!(e, SessionEvent::PoisDiscovered { .. })).unwrap();
        let weather_at =
            position(&updates, |e| matches!(e, SessionEvent::WeatherResolved { .. })).unwrap();
        assert!(center_at < pois_at);
        assert!(center_at < weather_at);
        assert!(updates.last().unwrap().is_terminal());

        let view = orchestrator.view();
        assert_eq!(view.status, SessionStatus::Done);
        assert_eq!(view.pois.len(), 3);
        assert_eq!(view.display_name.as_deref(), Some("Quận 1, Thành phố Hồ Chí Minh"));
    }

    #[tokio::test]
    async fn unknown_place_fails_without_running_later_stages() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_geocode()
            .times(1)
            .returning(|_| Ok(vec![]));
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby().never();
        let mut weather = MockWeatherPort::new();
        weather.expect_get_forecast().never();
        weather.expect_get_overview().never();
        let mut history = MockHistoryRepository::new();
        history.expect_append().never();
        let orchestrator = orchestrator(geocoder, pois, weather, history);

        let handle = orchestrator
            .run_search("zzzzzznowhere", Some(user()))
            .unwrap();
        let (updates, outcome) = run_to_end(handle).await;

        let session = outcome.into_session().unwrap();
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.failure().map(|f| f.kind), Some(IssueKind::NotFound));
        assert!(session.status_message().contains("Location not found"));
        assert!(matches!(
            updates.last().map(|u| &u.event),
            Some(SessionEvent::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn geocoding_transport_error_is_fatal_service_error() {
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_geocode()
            .returning(|_| Err(ApplicationError::transport(Stage::Geocoding, "HTTP 503")));
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby().never();
        let orchestrator =
            orchestrator(geocoder, pois, MockWeatherPort::new(), MockHistoryRepository::new());

        let handle = orchestrator.run_search("Hà Nội", None).unwrap();
        let session = handle.finish().await.unwrap().into_session().unwrap();

        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.failure().map(|f| f.kind), Some(IssueKind::Transport));
        assert_eq!(session.status_message(), "Geocoding service error: HTTP 503");
    }

    #[tokio::test]
    async fn poi_failure_still_fetches_weather() {
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby().times(1).returning(|_| {
            Err(ApplicationError::transport(
                Stage::PoiDiscovery,
                "request timed out",
            ))
        });
        let mut history = MockHistoryRepository::new();
        history.expect_append().never();
        let orchestrator = orchestrator(geocoder_at(quan_1()), pois, working_weather(), history);

        let handle = orchestrator
            .run_search("Quận 1, TP.HCM", Some(user()))
            .unwrap();
        let (updates, outcome) = run_to_end(handle).await;

        let session = outcome.into_session().unwrap();
        assert_eq!(session.status(), SessionStatus::Done);
        assert!(session.pois().is_empty());
        assert_eq!(session.poi_outcome(), PoiOutcome::Failed);
        assert!(session.status_message().contains("POI discovery service error"));
        assert!(!session.status_message().contains("No cafe found nearby"));
        assert!(session.is_partial());
        assert!(position(&updates, |e| matches!(e, SessionEvent::WeatherResolved { .. })).is_some());
    }

    #[tokio::test]
    async fn zero_pois_is_reported_and_recorded() {
        let mut history = MockHistoryRepository::new();
        history
            .expect_append()
            .times(1)
            .withf(|entry| entry.result_count() == 0)
            .returning(|_| Ok(()));
        let orchestrator =
            orchestrator(geocoder_at(quan_1()), pois_returning(0), working_weather(), history);

        let handle = orchestrator.run_search("Quận 1", Some(user())).unwrap();
        let session = handle.finish().await.unwrap().into_session().unwrap();

        assert_eq!(session.status_message(), "No cafe found nearby");
        assert_eq!(session.poi_outcome(), PoiOutcome::Found { count: 0 });
    }

    #[tokio::test]
    async fn poi_results_are_capped() {
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby()
            .withf(|query| query.max_results == 5 && query.radius_meters == 500)
            .returning(|_| Ok((1..=8).map(cafe).collect()));
        let orchestrator = orchestrator(
            geocoder_at(quan_1()),
            pois,
            working_weather(),
            MockHistoryRepository::new(),
        );

        let session = orchestrator
            .run_search("Quận 1", None)
            .unwrap()
            .finish()
            .await
            .unwrap()
            .into_session()
            .unwrap();

        let names: Vec<_> = session.pois().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cafe 1", "Cafe 2", "Cafe 3", "Cafe 4", "Cafe 5"]);
    }

    #[tokio::test]
    async fn overview_failure_keeps_numeric_forecast() {
        let mut weather = MockWeatherPort::new();
        weather
            .expect_get_forecast()
            .returning(|location| Ok(snapshot(*location)));
        weather
            .expect_get_overview()
            .returning(|_| Err(ApplicationError::transport(Stage::WeatherOverview, "HTTP 401")));
        let orchestrator = orchestrator(
            geocoder_at(quan_1()),
            pois_returning(2),
            weather,
            MockHistoryRepository::new(),
        );

        let session = orchestrator
            .run_search("Quận 1", None)
            .unwrap()
            .finish()
            .await
            .unwrap()
            .into_session()
            .unwrap();

        let report = session.weather().unwrap();
        assert!(report.snapshot.is_some());
        assert!(report.overview.is_none());
        assert_eq!(session.status(), SessionStatus::Done);
        assert!(session.status_message().ends_with("weather partially available"));
        assert_eq!(session.advisories()[0].stage, Stage::WeatherOverview);
    }

    #[tokio::test]
    async fn history_failure_does_not_affect_search() {
        let mut history = MockHistoryRepository::new();
        history
            .expect_append()
            .times(1)
            .returning(|_| Err(ApplicationError::Internal("database is locked".to_string())));
        let orchestrator =
            orchestrator(geocoder_at(quan_1()), pois_returning(3), working_weather(), history);

        let outcome = orchestrator
            .run_search("Quận 1", Some(user()))
            .unwrap()
            .finish()
            .await
            .unwrap();

        let session = outcome.into_session().unwrap();
        assert_eq!(session.status(), SessionStatus::Done);
        assert_eq!(session.pois().len(), 3);
    }

    #[tokio::test]
    async fn anonymous_search_is_not_recorded() {
        let mut history = MockHistoryRepository::new();
        history.expect_append().never();
        let orchestrator =
            orchestrator(geocoder_at(quan_1()), pois_returning(1), working_weather(), history);

        let outcome = orchestrator.run_search("Quận 1", None).unwrap().finish().await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_using_a_generation() {
        let orchestrator = orchestrator(
            MockGeocodingPort::new(),
            MockPoiDiscoveryPort::new(),
            MockWeatherPort::new(),
            MockHistoryRepository::new(),
        );

        let result = orchestrator.run_search("   ", None);
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::EmptyQuery))
        ));
        assert_eq!(orchestrator.current_generation(), 0);
    }

    /// Geocoder that holds one query until released
    struct GatedGeocoder {
        gated_query: &'static str,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl GeocodingPort for GatedGeocoder {
        async fn geocode(&self, query: &str) -> Result<Vec<GeocodeMatch>, ApplicationError> {
            if query == self.gated_query {
                self.entered.notify_one();
                self.release.notified().await;
                return Ok(vec![GeocodeMatch::new(GeoLocation::ho_chi_minh_city(), None)]);
            }
            Ok(vec![GeocodeMatch::new(GeoLocation::hanoi(), None)])
        }

        async fn reverse_geocode(
            &self,
            _location: &GeoLocation,
        ) -> Result<Option<String>, ApplicationError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn newer_search_supersedes_older_one() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let geocoder = GatedGeocoder {
            gated_query: "Quận 1",
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        };
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby()
            .times(1)
            .withf(|query| query.center == GeoLocation::hanoi())
            .returning(|_| Ok(vec![cafe(1)]));
        let mut history = MockHistoryRepository::new();
        history
            .expect_append()
            .times(1)
            .withf(|entry| entry.query_text() == "Hà Nội")
            .returning(|_| Ok(()));
        let orchestrator = orchestrator(geocoder, pois, working_weather(), history);

        let first = orchestrator.run_search("Quận 1", Some(user())).unwrap();
        entered.notified().await;

        let second = orchestrator.run_search("Hà Nội", Some(user())).unwrap();
        let (_, second_outcome) = run_to_end(second).await;
        assert_eq!(
            second_outcome.session().map(SearchSession::status),
            Some(SessionStatus::Done)
        );

        release.notify_one();
        let (first_updates, first_outcome) = run_to_end(first).await;

        assert!(matches!(
            first_outcome,
            SearchOutcome::Superseded { generation: 1 }
        ));
        assert!(first_updates.iter().all(|u| u.event == SessionEvent::Started));

        let view = orchestrator.view();
        assert_eq!(view.generation, 2);
        assert_eq!(view.center, GeoLocation::hanoi());
        assert_eq!(view.query_text, "Hà Nội");
        assert_eq!(view.status, SessionStatus::Done);
    }

    #[tokio::test]
    async fn replay_uses_stored_coordinates_exactly() {
        let stored = GeoLocation::new(10.776_912_3, 106.700_981_1).unwrap();
        let entry = HistoryEntry::restore(
            HistoryEntryId::new(),
            user(),
            "Quận 1, TP.HCM".to_string(),
            stored,
            3,
            Utc::now(),
        );
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_geocode().never();
        geocoder
            .expect_reverse_geocode()
            .times(1)
            .withf(move |location| *location == stored)
            .returning(|_| Ok(Some("Bến Nghé, Quận 1".to_string())));
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby()
            .times(1)
            .withf(move |query| query.center == stored)
            .returning(|_| Ok(vec![cafe(1), cafe(2)]));
        let mut history = MockHistoryRepository::new();
        history
            .expect_append()
            .times(1)
            .withf(move |candidate| {
                candidate.location() == stored
                    && candidate.result_count() == 2
                    && candidate.query_text() == "Quận 1, TP.HCM"
            })
            .returning(|_| Ok(()));
        let orchestrator = orchestrator(geocoder, pois, working_weather(), history);

        let (updates, outcome) = run_to_end(orchestrator.replay(&entry, Some(user()))).await;

        let session = outcome.into_session().unwrap();
        assert_eq!(session.center(), Some(stored));
        assert_eq!(session.status(), SessionStatus::Done);
        assert_eq!(session.origin(), SearchOrigin::History { entry_id: entry.id() });
        assert!(matches!(
            updates.first().map(|u| &u.event),
            Some(SessionEvent::CenterResolved { center, display_name })
                if *center == stored && display_name.as_deref() == Some("Bến Nghé, Quận 1")
        ));
        let view = orchestrator.view();
        assert_eq!(view.center, stored);
        assert_eq!(view.display_name.as_deref(), Some("Bến Nghé, Quận 1"));
    }

    #[tokio::test]
    async fn anonymous_replay_survives_reverse_geocoding_failure() {
        let entry = HistoryEntry::restore(
            HistoryEntryId::new(),
            user(),
            "Quận 1".to_string(),
            quan_1(),
            1,
            Utc::now(),
        );
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_reverse_geocode()
            .returning(|_| Err(ApplicationError::transport(Stage::Geocoding, "HTTP 503")));
        let mut history = MockHistoryRepository::new();
        history.expect_append().never();
        let orchestrator = orchestrator(geocoder, pois_returning(1), working_weather(), history);

        let session = orchestrator
            .replay(&entry, None)
            .finish()
            .await
            .unwrap()
            .into_session()
            .unwrap();

        assert_eq!(session.status(), SessionStatus::Done);
        assert_eq!(session.display_name(), None);
        assert!(!session.is_partial());
    }

    /// Geocoder resolving "Quận 1" to Ho Chi Minh City and anything else to Hanoi
    fn two_city_geocoder() -> MockGeocodingPort {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_geocode().times(2).returning(|query| {
            let location = if query == "Quận 1" {
                GeoLocation::ho_chi_minh_city()
            } else {
                GeoLocation::hanoi()
            };
            Ok(vec![GeocodeMatch::new(location, None)])
        });
        geocoder
    }

    /// POI discovery that holds searches around one center until released
    struct GatedPois {
        gated_center: GeoLocation,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl PoiDiscoveryPort for GatedPois {
        async fn find_nearby(&self, query: &PoiQuery) -> Result<Vec<Poi>, ApplicationError> {
            if query.center == self.gated_center {
                self.entered.notify_one();
                self.release.notified().await;
                return Ok(vec![cafe(9)]);
            }
            Ok(vec![cafe(1)])
        }
    }

    #[tokio::test]
    async fn stale_pois_never_reach_the_newer_search() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let pois = GatedPois {
            gated_center: GeoLocation::ho_chi_minh_city(),
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        };
        let mut history = MockHistoryRepository::new();
        history
            .expect_append()
            .times(1)
            .withf(|entry| entry.query_text() == "Hà Nội")
            .returning(|_| Ok(()));
        let orchestrator = orchestrator(two_city_geocoder(), pois, working_weather(), history);

        let first = orchestrator.run_search("Quận 1", Some(user())).unwrap();
        entered.notified().await;
        let second = orchestrator.run_search("Hà Nội", Some(user())).unwrap();
        let (_, second_outcome) = run_to_end(second).await;
        assert_eq!(
            second_outcome.session().map(SearchSession::status),
            Some(SessionStatus::Done)
        );

        release.notify_one();
        let (first_updates, first_outcome) = run_to_end(first).await;

        assert!(matches!(
            first_outcome,
            SearchOutcome::Superseded { generation: 1 }
        ));
        assert!(
            position(&first_updates, |e| matches!(e, SessionEvent::PoisDiscovered { .. }))
                .is_none()
        );

        let view = orchestrator.view();
        assert_eq!(view.generation, 2);
        assert_eq!(view.status, SessionStatus::Done);
        let names: Vec<_> = view.pois.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cafe 1"]);
        let shown_at = view
            .weather
            .and_then(|report| report.snapshot)
            .map(|snapshot| snapshot.location);
        assert_eq!(shown_at, Some(GeoLocation::hanoi()));
    }

    /// Weather whose forecast holds for one location until released
    struct GatedWeather {
        gated_location: GeoLocation,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl WeatherPort for GatedWeather {
        async fn get_forecast(
            &self,
            location: &GeoLocation,
        ) -> Result<WeatherSnapshot, ApplicationError> {
            if *location == self.gated_location {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(snapshot(*location))
        }

        async fn get_overview(
            &self,
            location: &GeoLocation,
        ) -> Result<WeatherOverview, ApplicationError> {
            let mut overview = overview();
            if *location == self.gated_location {
                overview.text = "Nắng nóng".to_string();
            }
            Ok(overview)
        }
    }

    #[tokio::test]
    async fn stale_weather_never_reaches_the_newer_search() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let weather = GatedWeather {
            gated_location: GeoLocation::ho_chi_minh_city(),
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        };
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby().times(2).returning(|query| {
            if query.center == GeoLocation::hanoi() {
                Ok(vec![cafe(1)])
            } else {
                Ok(vec![cafe(7), cafe(8)])
            }
        });
        let mut history = MockHistoryRepository::new();
        history
            .expect_append()
            .times(1)
            .withf(|entry| entry.query_text() == "Hà Nội")
            .returning(|_| Ok(()));
        let orchestrator = orchestrator(two_city_geocoder(), pois, weather, history);

        let first = orchestrator.run_search("Quận 1", Some(user())).unwrap();
        entered.notified().await;
        let second = orchestrator.run_search("Hà Nội", Some(user())).unwrap();
        let (_, second_outcome) = run_to_end(second).await;
        assert_eq!(
            second_outcome.session().map(SearchSession::status),
            Some(SessionStatus::Done)
        );

        release.notify_one();
        let (first_updates, first_outcome) = run_to_end(first).await;

        assert!(matches!(
            first_outcome,
            SearchOutcome::Superseded { generation: 1 }
        ));
        assert!(
            position(&first_updates, |e| matches!(e, SessionEvent::WeatherResolved { .. }))
                .is_none()
        );

        let view = orchestrator.view();
        assert_eq!(view.generation, 2);
        assert_eq!(view.center, GeoLocation::hanoi());
        let names: Vec<_> = view.pois.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cafe 1"]);
        let report = view.weather.unwrap();
        assert_eq!(
            report.snapshot.map(|snapshot| snapshot.location),
            Some(GeoLocation::hanoi())
        );
        assert_eq!(report.overview.map(|o| o.text).as_deref(), Some("Trời nhiều mây, có mưa rào"));
    }

    /// History that holds the first append until released
    struct GatedHistory {
        gated_query: &'static str,
        entered: Arc<Notify>,
        release: Arc<Notify>,
        recorded: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HistoryRepository for GatedHistory {
        async fn append(&self, entry: &HistoryEntry) -> Result<(), ApplicationError> {
            if entry.query_text() == self.gated_query {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.recorded
                .lock()
                .unwrap()
                .push(entry.query_text().to_string());
            Ok(())
        }

        async fn list_recent(
            &self,
            _user_id: &UserId,
            _limit: usize,
        ) -> Result<Vec<HistoryEntry>, ApplicationError> {
            Ok(vec![])
        }

        async fn clear(&self, _user_id: &UserId) -> Result<u64, ApplicationError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn finished_search_is_recorded_after_a_newer_one_starts() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let history = Arc::new(GatedHistory {
            gated_query: "Quận 1",
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
            recorded: std::sync::Mutex::new(Vec::new()),
        });
        let mut pois = MockPoiDiscoveryPort::new();
        pois.expect_find_nearby()
            .times(2)
            .returning(|_| Ok(vec![cafe(1)]));
        let orchestrator = Arc::new(SearchOrchestrator::new(
            Arc::new(two_city_geocoder()),
            Arc::new(pois),
            Arc::new(weather_for(2)),
            HistoryStore::new(Arc::clone(&history) as Arc<dyn HistoryRepository>),
            SearchSettings::default(),
        ));

        let first = orchestrator.run_search("Quận 1", Some(user())).unwrap();
        entered.notified().await;
        let second = orchestrator.run_search("Hà Nội", Some(user())).unwrap();
        second.finish().await.unwrap();

        release.notify_one();
        let first_outcome = first.finish().await.unwrap();

        assert_eq!(
            first_outcome.session().map(SearchSession::status),
            Some(SessionStatus::Done)
        );
        let recorded = history.recorded.lock().unwrap().clone();
        assert_eq!(recorded, ["Hà Nội", "Quận 1"]);
        assert_eq!(orchestrator.view().query_text, "Hà Nội");
    }

    /// Weather port whose two calls only complete if both are in flight
    struct RendezvousWeather {
        barrier: Barrier,
    }

    #[async_trait]
    impl WeatherPort for RendezvousWeather {
        async fn get_forecast(
            &self,
            location: &GeoLocation,
        ) -> Result<WeatherSnapshot, ApplicationError> {
            self.barrier.wait().await;
            Ok(snapshot(*location))
        }

        async fn get_overview(
            &self,
            _location: &GeoLocation,
        ) -> Result<WeatherOverview, ApplicationError> {
            self.barrier.wait().await;
            Ok(overview())
        }
    }

    #[tokio::test]
    async fn forecast_and_overview_run_concurrently() {
        let weather = RendezvousWeather {
            barrier: Barrier::new(2),
        };
        let orchestrator = orchestrator(
            geocoder_at(quan_1()),
            pois_returning(1),
            weather,
            MockHistoryRepository::new(),
        );

        let handle = orchestrator.run_search("Quận 1", None).unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(5), handle.finish())
            .await
            .expect("weather fetches must not run one after the other")
            .unwrap();

        assert!(outcome.session().unwrap().weather().unwrap().is_complete());
    }

    #[tokio::test]
    async fn route_only_shows_for_newest_generation() {
        let orchestrator = orchestrator(
            geocoder_at(quan_1()),
            pois_returning(1),
            working_weather(),
            MockHistoryRepository::new(),
        );
        let handle = orchestrator.run_search("Quận 1", None).unwrap();
        let generation = handle.generation();
        handle.finish().await.unwrap();

        let route = RouteResult {
            geometry: json!({"type": "LineString", "coordinates": []}),
            distance_meters: 800.0,
            duration_seconds: 120.0,
            destination_name: "Cafe 1".to_string(),
        };
        assert!(!orchestrator.show_route(generation + 1, route.clone()));
        assert!(orchestrator.show_route(generation, route));
        assert!(orchestrator.view().route.is_visible());

        orchestrator.clear_route();
        assert!(!orchestrator.view().route.is_visible());
    }

    #[tokio::test]
    async fn subscribers_see_final_state() {
        let orchestrator = orchestrator(
            geocoder_at(quan_1()),
            pois_returning(2),
            working_weather(),
            MockHistoryRepository::new(),
        );
        let mut rx = orchestrator.subscribe();

        orchestrator
            .run_search("Quận 1", None)
            .unwrap()
            .finish()
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.status, SessionStatus::Done);
        assert_eq!(view.pois.len(), 2);
    }
}
