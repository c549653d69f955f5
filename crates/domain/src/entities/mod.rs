//! Domain entities - Objects with identity and lifecycle

mod history_entry;
mod poi;
mod route;
mod search_session;
mod session_issue;
mod weather;

pub use history_entry::HistoryEntry;
pub use poi::Poi;
pub use route::RouteResult;
pub use search_session::{PoiOutcome, SearchOrigin, SearchSession, SessionStatus};
pub use session_issue::{IssueKind, SessionIssue, Stage};
pub use weather::{
    CurrentConditions, DailyForecast, DailyTemperatures, HourlyForecast, WeatherCondition,
    WeatherOverview, WeatherReport, WeatherSnapshot, format_temperature,
};
