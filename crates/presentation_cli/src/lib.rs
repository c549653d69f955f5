//! placefinder command-line front end
//!
//! Wires the adapters, persistence and services together and exposes the
//! search pipeline, routing and search history as subcommands.

pub mod cli;
pub mod output;
pub mod wiring;

pub use cli::{Cli, Commands, HistoryCommand};
pub use wiring::App;
