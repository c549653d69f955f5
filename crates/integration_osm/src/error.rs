//! OSM service error types

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to an OSM service
#[derive(Debug, Error)]
pub enum OsmError {
    /// Connection to the service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered with a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the service)
        retry_after_secs: Option<u64>,
    },

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Rejected before sending
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The routing service found no route between the points
    #[error("No route found")]
    NoRouteFound,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl OsmError {
    /// Map a failed send into a timeout or connection error
    pub(crate) fn from_send(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }

    /// Map a non-success status
    pub(crate) fn from_status(status: StatusCode, retry_after: Option<&str>) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded {
                retry_after_secs: retry_after.and_then(|v| v.trim().parse().ok()),
            },
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                Self::ServiceUnavailable(format!("HTTP {status}"))
            },
            _ => Self::RequestFailed(format!("HTTP {status}")),
        }
    }
}
