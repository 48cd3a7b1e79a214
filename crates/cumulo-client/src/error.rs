//! Control-plane API error taxonomy.

use thiserror::Error;

/// Errors surfaced by the control-plane client.
///
/// Every HTTP response is classified into exactly one of the first four
/// variants; the rest cover the client's own failure modes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The resource does not exist (exactly HTTP 404). Callers may treat
    /// this as "absent" rather than a hard failure; a delete on an
    /// already-gone resource is not an error.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller-fixable error (HTTP 400-499 excluding 404), with the
    /// remote-supplied message when the body decodes.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Remote-side fault (any other non-2xx). No structured message is
    /// guaranteed, so only the status is carried.
    #[error("server error (HTTP {status})")]
    Server { status: u16 },

    /// Throttling persisted through the entire retry policy.
    #[error("requests consistently rate limited")]
    RateLimited,

    /// The caller's cancellation signal fired during a suspension point.
    #[error("operation cancelled")]
    Cancelled,

    /// Transport-level failure (DNS, connection, request timeout). Never
    /// retried by the client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body that did not decode into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client-side configuration problem.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Create a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create a client error with the given status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a server error for the given status.
    #[must_use]
    pub fn server(status: u16) -> Self {
        Self::Server { status }
    }

    /// Create an invalid-configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether this error means the resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// Whether this error reflects caller-initiated cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// Result type for control-plane operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::api(400, "service name already in use");
        assert_eq!(
            err.to_string(),
            "API error (HTTP 400): service name already in use"
        );

        let err = ApiError::server(503);
        assert_eq!(err.to_string(), "server error (HTTP 503)");
    }

    #[test]
    fn test_is_not_found() {
        assert!(ApiError::not_found("srv-1").is_not_found());
        assert!(!ApiError::RateLimited.is_not_found());
        assert!(!ApiError::server(500).is_not_found());
    }

    #[test]
    fn test_is_cancelled() {
        assert!(ApiError::Cancelled.is_cancelled());
        assert!(!ApiError::not_found("srv-1").is_cancelled());
    }
}
