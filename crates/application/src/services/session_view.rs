//! What the presentation layer should currently show
//!
//! [`SessionView`] is the single piece of shared state written by searches.
//! [`SessionUpdate`] is one step of a single search, delivered on that
//! search's own stream.

use domain::{
    GeoLocation, Poi, SearchSession, SessionIssue, SessionStatus, WeatherReport,
};
use serde::Serialize;

use crate::services::route_workflow::RouteOverlay;

/// Shared, newest-search-wins display state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Generation of the search that last wrote this view (0 before any)
    pub generation: u64,
    pub query_text: String,
    pub status: SessionStatus,
    /// Map center; stays on the previous center until a new one resolves
    pub center: GeoLocation,
    pub display_name: Option<String>,
    /// POI markers
    pub pois: Vec<Poi>,
    pub weather: Option<WeatherReport>,
    pub route: RouteOverlay,
    pub status_message: String,
    pub advisories: Vec<SessionIssue>,
}

impl SessionView {
    /// View before any search, centered on `center`
    #[must_use]
    pub fn initial(center: GeoLocation) -> Self {
        Self {
            generation: 0,
            query_text: String::new(),
            status: SessionStatus::Idle,
            center,
            display_name: None,
            pois: Vec::new(),
            weather: None,
            route: RouteOverlay::default(),
            status_message: String::new(),
            advisories: Vec::new(),
        }
    }

    /// Hand the view over to a newer search
    pub(crate) fn begin(&mut self, session: &SearchSession) {
        self.generation = session.generation();
        self.display_name = None;
        self.pois.clear();
        self.weather = None;
        self.route.clear();
        self.sync(session);
    }

    /// Copy the session's current state into the view
    pub(crate) fn sync(&mut self, session: &SearchSession) {
        self.generation = session.generation();
        session.query_text().clone_into(&mut self.query_text);
        self.status = session.status();
        if let Some(center) = session.center() {
            self.center = center;
        }
        if let Some(name) = session.display_name() {
            self.display_name = Some(name.to_string());
        }
        session.pois().clone_into(&mut self.pois);
        self.weather = session.weather().cloned();
        session.status_message().clone_into(&mut self.status_message);
        session.advisories().clone_into(&mut self.advisories);
    }
}

/// What happened in a search step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Geocoding started
    Started,
    /// The search center is known; callers re-center the map here
    CenterResolved {
        center: GeoLocation,
        display_name: Option<String>,
    },
    DiscoveringPois,
    PoisDiscovered { pois: Vec<Poi> },
    /// Advisory: discovery failed, the search goes on without POIs
    PoiDiscoveryFailed { issue: SessionIssue },
    FetchingWeather,
    /// Both weather fetches resolved; `issues` lists the ones that failed
    WeatherResolved {
        report: WeatherReport,
        issues: Vec<SessionIssue>,
    },
    /// Terminal success; `result_count` is `None` when discovery failed
    Completed { result_count: Option<usize> },
    /// Terminal failure
    Failed { issue: SessionIssue },
}

/// One step of one search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUpdate {
    pub generation: u64,
    pub status: SessionStatus,
    pub status_message: String,
    #[serde(flatten)]
    pub event: SessionEvent,
}

impl SessionUpdate {
    pub(crate) fn new(session: &SearchSession, event: SessionEvent) -> Self {
        Self {
            generation: session.generation(),
            status: session.status(),
            status_message: session.status_message().to_string(),
            event,
        }
    }

    /// Whether this update ends the search
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self.event,
            SessionEvent::Completed { .. } | SessionEvent::Failed { .. }
        )
    }
}
