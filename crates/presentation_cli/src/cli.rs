//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use domain::{GeoLocation, PoiCategory, UserId};

/// placefinder CLI
#[derive(Debug, Parser)]
#[command(name = "placefinder")]
#[command(version, about = "Find places, nearby POIs, weather and routes", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "PLACEFINDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Geocode a place, then list nearby POIs and the weather there
    Search {
        /// Free-text place name
        query: String,

        /// Record the search in this user's history
        #[arg(short, long, value_parser = parse_user)]
        user: Option<UserId>,

        /// Amenity to look for (cafe, restaurant, hotel, ...)
        #[arg(long, value_parser = parse_category)]
        category: Option<PoiCategory>,
    },

    /// Compute a driving route between two coordinates
    ///
    /// Example: placefinder route --from 10.776,106.700 --to 10.772,106.698
    Route {
        /// Start as "lat,lon"
        #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
        from: GeoLocation,

        /// Destination as "lat,lon"
        #[arg(long, value_parser = parse_lat_lon, allow_hyphen_values = true)]
        to: GeoLocation,

        /// Destination name shown in the summary
        #[arg(long, default_value = "destination")]
        name: String,
    },

    /// Show, replay or clear recent searches
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List the most recent searches
    List {
        #[arg(short, long, value_parser = parse_user)]
        user: UserId,

        /// How many entries (defaults to search.history_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Re-run a recent search at its stored coordinates
    Replay {
        #[arg(short, long, value_parser = parse_user)]
        user: UserId,

        /// Position in the list, newest first
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },

    /// Delete all of a user's searches
    Clear {
        #[arg(short, long, value_parser = parse_user)]
        user: UserId,
    },
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Parse "lat,lon"
pub fn parse_lat_lon(s: &str) -> Result<GeoLocation, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {s:?}"))?;
    GeoLocation::parse(lat, lon).map_err(|e| e.to_string())
}

fn parse_user(s: &str) -> Result<UserId, String> {
    UserId::parse(s).map_err(|e| e.to_string())
}

fn parse_category(s: &str) -> Result<PoiCategory, String> {
    let category = PoiCategory::from(s.trim());
    if category.is_valid_tag() {
        Ok(category)
    } else {
        Err(format!("not a valid amenity tag: {s:?}"))
    }
}
