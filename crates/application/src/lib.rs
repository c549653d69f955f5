//! Application layer - Use cases and orchestration
//!
//! Contains the search pipeline (geocode, POI discovery, weather, history),
//! the route workflow and the port definitions implemented by the
//! infrastructure adapters.

pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
pub use settings::SearchSettings;
