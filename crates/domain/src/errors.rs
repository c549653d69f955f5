//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Coordinates outside the valid latitude/longitude range
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Search query was empty after trimming
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// Malformed user identifier
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Illegal state transition on a search session
    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl DomainError {
    /// Create an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }
}
