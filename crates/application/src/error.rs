//! Application-level errors

use domain::{DomainError, SessionIssue, Stage};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Geocoding returned no match for the query
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Routing service returned zero routes
    #[error("No route found")]
    NoRouteFound,

    /// Network failure or non-success response from an external service
    #[error("{stage} service error: {message}")]
    Transport { stage: Stage, message: String },

    /// Caller supplied something unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Create a transport error tagged with its stage
    pub fn transport(stage: Stage, message: impl Into<String>) -> Self {
        Self::Transport {
            stage,
            message: message.into(),
        }
    }

    /// Stage the error is tagged with, if any
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Transport { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether the service answered but had nothing to give
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::LocationNotFound(_) | Self::NoRouteFound)
    }

    /// Record this error against a session stage instead of raising it
    pub fn to_issue(&self, stage: Stage) -> SessionIssue {
        match self {
            Self::LocationNotFound(_) | Self::NoRouteFound => {
                SessionIssue::not_found(stage, self.to_string())
            },
            Self::Transport { message, .. } => SessionIssue::transport(stage, message.clone()),
            other => SessionIssue::transport(stage, other.to_string()),
        }
    }

    /// Ensure an error leaving a stage carries that stage's tag
    #[must_use]
    pub fn tagged(self, stage: Stage) -> Self {
        match self {
            Self::Transport { .. } | Self::LocationNotFound(_) | Self::NoRouteFound => self,
            other => Self::transport(stage, other.to_string()),
        }
    }
}
