//! Failures recorded against a search session

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Place name to coordinates
    Geocoding,
    /// Nearby POI search
    PoiDiscovery,
    /// Driving route computation
    Routing,
    /// Numeric weather forecast
    WeatherForecast,
    /// Textual weather overview
    WeatherOverview,
    /// Search history persistence
    History,
}

impl Stage {
    /// Human-readable stage name
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Geocoding => "geocoding",
            Self::PoiDiscovery => "POI discovery",
            Self::Routing => "routing",
            Self::WeatherForecast => "weather forecast",
            Self::WeatherOverview => "weather overview",
            Self::History => "search history",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The service answered but had nothing for us
    NotFound,
    /// The service could not be reached or answered with an error
    Transport,
    /// Part of the enrichment is missing; the session continued
    Partial,
}

/// A failure captured in session state instead of being raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIssue {
    pub stage: Stage,
    pub kind: IssueKind,
    pub message: String,
}

impl SessionIssue {
    #[must_use]
    pub fn not_found(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: IssueKind::NotFound,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transport(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: IssueKind::Transport,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn partial(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: IssueKind::Partial,
            message: message.into(),
        }
    }
}

impl fmt::Display for SessionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}): {}", self.stage, self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::PoiDiscovery.to_string(), "POI discovery");
        assert_eq!(Stage::WeatherOverview.label(), "weather overview");
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::WeatherForecast).unwrap();
        assert_eq!(json, "\"weather_forecast\"");
    }

    #[test]
    fn issue_display_names_stage() {
        let issue = SessionIssue::transport(Stage::PoiDiscovery, "HTTP 504");
        let text = issue.to_string();
        assert!(text.contains("POI discovery"));
        assert!(text.contains("HTTP 504"));
    }
}
