//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer on top of the OSM and
//! OpenWeather integration crates and SQLite, and provides configuration
//! loading and logging setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, DatabaseConfig};
pub use persistence::{ConnectionPool, DatabaseError, SqliteHistoryStore, create_pool};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
