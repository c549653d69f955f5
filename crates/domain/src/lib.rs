//! Domain layer for placefinder
//!
//! Contains the entities and value objects shared by the search pipeline:
//! geographic coordinates, points of interest, routes, weather snapshots,
//! search history entries and the search session state machine.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
