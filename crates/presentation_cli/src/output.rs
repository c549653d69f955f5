//! Text rendering for terminal output

use std::fmt::Write as _;

use application::{SessionEvent, SessionUpdate};
use chrono::{DateTime, Utc};
use domain::{
    GeoLocation, HistoryEntry, Poi, RouteResult, SearchSession, SessionIssue, WeatherReport,
    format_temperature,
};

/// Daily forecast lines shown under a search result
const DAILY_LINES: usize = 3;

/// One line per pipeline step
pub fn render_update(update: &SessionUpdate) -> String {
    let detail = match &update.event {
        SessionEvent::CenterResolved {
            center,
            display_name,
        } => match display_name {
            Some(name) => format!("center {center} ({name})"),
            None => format!("center {center}"),
        },
        SessionEvent::Started
        | SessionEvent::DiscoveringPois
        | SessionEvent::FetchingWeather
        | SessionEvent::Completed { .. } => update.status_message.clone(),
        SessionEvent::PoisDiscovered { pois } => format!("{} POI(s) found", pois.len()),
        SessionEvent::PoiDiscoveryFailed { issue } | SessionEvent::Failed { issue } => {
            render_issue(issue)
        },
        SessionEvent::WeatherResolved { report, issues } => {
            let mut line = if report.is_complete() {
                "weather ready".to_string()
            } else if report.is_empty() {
                "weather unavailable".to_string()
            } else {
                "weather partially available".to_string()
            };
            for issue in issues {
                let _ = write!(line, "; {}", render_issue(issue));
            }
            line
        },
    };
    format!("[#{} {}] {detail}", update.generation, update.status.as_str())
}

/// Full result of a finished search
pub fn render_session(session: &SearchSession) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Search: {}", session.query_text());

    if let Some(failure) = session.failure() {
        let _ = writeln!(out, "Failed: {}", render_issue(failure));
        return out;
    }

    if let Some(center) = session.center() {
        match session.display_name() {
            Some(name) => {
                let _ = writeln!(out, "Location: {name} ({center})");
            },
            None => {
                let _ = writeln!(out, "Location: {center}");
            },
        }
    }
    let _ = writeln!(out, "{}", session.status_message());

    if let Some(center) = session.center() {
        for (i, poi) in session.pois().iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, render_poi(poi, &center));
        }
    }

    if let Some(report) = session.weather() {
        out.push_str(&render_weather(report));
    }

    for issue in session.advisories() {
        let _ = writeln!(out, "Note: {}", render_issue(issue));
    }
    out
}

fn render_poi(poi: &Poi, center: &GeoLocation) -> String {
    let mut line = format!("{} ({:.0} m)", poi.name, poi.distance_from(center));
    if let Some(phone) = poi.phone() {
        let _ = write!(line, " tel {phone}");
    }
    if let Some(website) = poi.website() {
        let _ = write!(line, " {website}");
    }
    line
}

fn render_weather(report: &WeatherReport) -> String {
    let mut out = String::new();
    if let Some(snapshot) = &report.snapshot {
        let _ = writeln!(out, "Weather now: {}", snapshot.current.summary());
        for day in snapshot.daily.iter().take(DAILY_LINES) {
            let _ = writeln!(
                out,
                "  {}: {} / {}{}",
                day.date.format("%d/%m"),
                format_temperature(day.temperature.min),
                format_temperature(day.temperature.max),
                day.condition
                    .as_ref()
                    .map(|c| format!(" {} {}", c.emoji(), c.description))
                    .unwrap_or_default()
            );
        }
    }
    if let Some(text) = report.overview_text() {
        let _ = writeln!(out, "Overview: {text}");
    }
    out
}

fn render_issue(issue: &SessionIssue) -> String {
    format!("{} failed: {}", issue.stage, issue.message)
}

pub fn render_route(route: &RouteResult) -> String {
    route.summary()
}

/// Numbered history list, newest first
pub fn render_history(entries: &[HistoryEntry], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return "No recent searches\n".to_string();
    }
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{i}. {} ({} result(s), {})",
            entry.query_text(),
            entry.result_count(),
            entry.age_label(now)
        );
    }
    out
}
