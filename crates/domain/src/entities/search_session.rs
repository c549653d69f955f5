//! Search session entity
//!
//! Tracks one search from query to enriched result. The session moves
//! strictly forward:
//!
//! ```text
//! idle -> geocoding -> finding_pois -> fetching_weather -> done
//!   \________\______________\______________\________-> failed
//! ```
//!
//! A replay from history skips `geocoding` and enters `finding_pois` with a
//! known center.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::{Poi, SessionIssue, Stage, WeatherReport};
use crate::errors::DomainError;
use crate::value_objects::{GeoLocation, HistoryEntryId, PoiCategory};

/// Lifecycle state of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Geocoding,
    FindingPois,
    FetchingWeather,
    Done,
    Failed,
}

impl SessionStatus {
    /// Whether the session can no longer change
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Geocoding => "geocoding",
            Self::FindingPois => "finding_pois",
            Self::FetchingWeather => "fetching_weather",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the search was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchOrigin {
    /// Free-text query that needs geocoding
    Query,
    /// Replay of a stored history entry at its exact coordinates
    History { entry_id: HistoryEntryId },
}

/// Result of the POI discovery stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoiOutcome {
    /// Discovery has not finished
    #[default]
    Pending,
    /// Discovery succeeded (possibly with zero results)
    Found { count: usize },
    /// Discovery failed; the POI list is empty for that reason
    Failed,
}

/// One in-flight or completed search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSession {
    query_text: String,
    generation: u64,
    origin: SearchOrigin,
    status: SessionStatus,
    center: Option<GeoLocation>,
    display_name: Option<String>,
    category: PoiCategory,
    pois: Vec<Poi>,
    poi_outcome: PoiOutcome,
    weather: Option<WeatherReport>,
    failure: Option<SessionIssue>,
    advisories: Vec<SessionIssue>,
    status_message: String,
}

impl SearchSession {
    /// Start a session for a free-text query
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyQuery` if the query is blank.
    pub fn new(query_text: &str, generation: u64) -> Result<Self, DomainError> {
        let query = query_text.trim();
        if query.is_empty() {
            return Err(DomainError::EmptyQuery);
        }
        Ok(Self::blank(query.to_string(), generation, SearchOrigin::Query))
    }

    /// Start a session that replays a history entry at a known center
    #[must_use]
    pub fn replay(
        query_text: &str,
        generation: u64,
        entry_id: HistoryEntryId,
        center: GeoLocation,
    ) -> Self {
        let mut session = Self::blank(
            query_text.trim().to_string(),
            generation,
            SearchOrigin::History { entry_id },
        );
        session.center = Some(center);
        session.status_message = format!("Returning to \"{}\"", session.query_text);
        session
    }

    /// Name the stored center of a replay before discovery starts
    pub fn name_center(&mut self, display_name: String) -> Result<(), DomainError> {
        if self.status != SessionStatus::Idle || self.center.is_none() {
            return Err(DomainError::invalid_transition(self.status.as_str(), "named"));
        }
        self.display_name = Some(display_name);
        Ok(())
    }

    fn blank(query_text: String, generation: u64, origin: SearchOrigin) -> Self {
        Self {
            query_text,
            generation,
            origin,
            status: SessionStatus::Idle,
            center: None,
            display_name: None,
            category: PoiCategory::default(),
            pois: Vec::new(),
            poi_outcome: PoiOutcome::Pending,
            weather: None,
            failure: None,
            advisories: Vec::new(),
            status_message: String::new(),
        }
    }

    fn transition(&mut self, allowed: &[SessionStatus], to: SessionStatus) -> Result<(), DomainError> {
        if !allowed.contains(&self.status) {
            return Err(DomainError::invalid_transition(self.status.as_str(), to.as_str()));
        }
        self.status = to;
        Ok(())
    }

    /// `idle -> geocoding`
    pub fn begin_geocoding(&mut self) -> Result<(), DomainError> {
        self.transition(&[SessionStatus::Idle], SessionStatus::Geocoding)?;
        self.status_message = format!("Searching for \"{}\"...", self.query_text);
        Ok(())
    }

    /// Record the resolved center while geocoding
    pub fn locate(
        &mut self,
        center: GeoLocation,
        display_name: Option<String>,
    ) -> Result<(), DomainError> {
        if self.status != SessionStatus::Geocoding {
            return Err(DomainError::invalid_transition(self.status.as_str(), "located"));
        }
        self.center = Some(center);
        self.status_message = display_name
            .as_deref()
            .map_or_else(|| format!("Found {center}"), |name| format!("Found {name}"));
        self.display_name = display_name;
        Ok(())
    }

    /// `geocoding | idle (replay) -> finding_pois`
    pub fn begin_poi_discovery(&mut self, category: PoiCategory) -> Result<(), DomainError> {
        if self.center.is_none() {
            return Err(DomainError::invalid_transition(
                self.status.as_str(),
                "finding_pois without a center",
            ));
        }
        self.transition(
            &[SessionStatus::Idle, SessionStatus::Geocoding],
            SessionStatus::FindingPois,
        )?;
        self.status_message = format!("Searching for nearby {category}...");
        self.category = category;
        Ok(())
    }

    /// Discovery succeeded with `pois` (possibly empty)
    pub fn record_pois(&mut self, pois: Vec<Poi>) -> Result<(), DomainError> {
        self.expect_status(SessionStatus::FindingPois, "pois recorded")?;
        self.poi_outcome = PoiOutcome::Found { count: pois.len() };
        self.pois = pois;
        self.status_message = self.poi_message();
        Ok(())
    }

    /// Discovery failed; the session carries on with an empty list
    pub fn record_poi_failure(&mut self, issue: SessionIssue) -> Result<(), DomainError> {
        self.expect_status(SessionStatus::FindingPois, "pois failed")?;
        self.poi_outcome = PoiOutcome::Failed;
        self.pois.clear();
        self.advisories.push(issue);
        self.status_message = self.poi_message();
        Ok(())
    }

    /// `finding_pois -> fetching_weather`
    pub fn begin_weather(&mut self) -> Result<(), DomainError> {
        if self.poi_outcome == PoiOutcome::Pending {
            return Err(DomainError::invalid_transition(
                self.status.as_str(),
                "fetching_weather before POI discovery resolved",
            ));
        }
        self.transition(&[SessionStatus::FindingPois], SessionStatus::FetchingWeather)?;
        Ok(())
    }

    /// Store whatever the weather fetches produced, plus their failures
    pub fn record_weather(
        &mut self,
        report: WeatherReport,
        issues: Vec<SessionIssue>,
    ) -> Result<(), DomainError> {
        self.expect_status(SessionStatus::FetchingWeather, "weather recorded")?;
        self.weather = Some(report);
        self.advisories.extend(issues);
        Ok(())
    }

    /// `fetching_weather -> done`
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.weather.is_none() {
            return Err(DomainError::invalid_transition(
                self.status.as_str(),
                "done before weather resolved",
            ));
        }
        self.transition(&[SessionStatus::FetchingWeather], SessionStatus::Done)?;
        self.status_message = self.final_message();
        Ok(())
    }

    /// Any non-terminal state `-> failed`
    pub fn fail(&mut self, issue: SessionIssue) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_transition(self.status.as_str(), "failed"));
        }
        self.status = SessionStatus::Failed;
        self.status_message = match issue.kind {
            crate::entities::IssueKind::NotFound => {
                format!("Location not found: \"{}\"", self.query_text)
            },
            _ => format!("{} service error: {}", capitalize(issue.stage.label()), issue.message),
        };
        self.failure = Some(issue);
        Ok(())
    }

    fn expect_status(&self, expected: SessionStatus, to: &str) -> Result<(), DomainError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(self.status.as_str(), to))
        }
    }

    fn poi_message(&self) -> String {
        match self.poi_outcome {
            PoiOutcome::Pending => format!("Searching for nearby {}...", self.category),
            PoiOutcome::Found { count: 0 } => format!("No {} found nearby", self.category),
            PoiOutcome::Found { count } => format!("Found {count} {} nearby", self.category),
            PoiOutcome::Failed => format!(
                "Could not search for nearby {} (POI discovery service error)",
                self.category
            ),
        }
    }

    fn final_message(&self) -> String {
        let mut message = self.poi_message();
        let weather_failures = self
            .advisories
            .iter()
            .filter(|i| matches!(i.stage, Stage::WeatherForecast | Stage::WeatherOverview))
            .count();
        match (&self.weather, weather_failures) {
            (_, 0) => {},
            (Some(report), _) if report.is_empty() => message.push_str("; weather unavailable"),
            _ => message.push_str("; weather partially available"),
        }
        message
    }

    #[must_use]
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn origin(&self) -> SearchOrigin {
        self.origin
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn center(&self) -> Option<GeoLocation> {
        self.center
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub const fn category(&self) -> &PoiCategory {
        &self.category
    }

    #[must_use]
    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    #[must_use]
    pub const fn poi_outcome(&self) -> PoiOutcome {
        self.poi_outcome
    }

    #[must_use]
    pub const fn weather(&self) -> Option<&WeatherReport> {
        self.weather.as_ref()
    }

    /// The fatal failure, if the session ended in `failed`
    #[must_use]
    pub const fn failure(&self) -> Option<&SessionIssue> {
        self.failure.as_ref()
    }

    /// Advisory failures the session continued past
    #[must_use]
    pub fn advisories(&self) -> &[SessionIssue] {
        &self.advisories
    }

    /// Whether the session finished with some enrichment missing
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.status == SessionStatus::Done && !self.advisories.is_empty()
    }

    #[must_use]
    pub fn status_message(&self) -> &str {
        &self.status_message
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
