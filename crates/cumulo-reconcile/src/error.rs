//! Reconciliation error types.

use cumulo_client::ApiError;
use thiserror::Error;

/// Errors that can occur while reconciling a resource.
///
/// A failed orchestration surfaces the first step's error and leaves the
/// resource in whatever partial state the completed steps produced; the
/// control plane is the source of truth, so callers re-read the resource
/// and re-run reconciliation rather than assume anything about the steps
/// that never ran.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A control-plane call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The most recent deploy reached a terminal failure status.
    #[error("deploy {deploy_id} failed with status {status}")]
    DeployFailed {
        deploy_id: String,
        status: &'static str,
    },

    /// A poll deadline elapsed. Distinguished from cancellation, which
    /// reflects a caller-initiated abort.
    #[error("timed out after {elapsed_secs}s waiting for {waiting_for}")]
    Timeout {
        waiting_for: String,
        elapsed_secs: u64,
    },

    /// The caller's cancellation signal fired during a poll sleep.
    #[error("operation cancelled")]
    Cancelled,
}

impl ReconcileError {
    /// Whether this error reflects caller-initiated cancellation, at any
    /// suspension point.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            ReconcileError::Cancelled => true,
            ReconcileError::Api(api) => api.is_cancelled(),
            _ => false,
        }
    }

    /// Whether this error is a poll deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReconcileError::Timeout { .. })
    }
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_detected_through_api_errors() {
        assert!(ReconcileError::Cancelled.is_cancelled());
        assert!(ReconcileError::Api(ApiError::Cancelled).is_cancelled());
        assert!(!ReconcileError::Api(ApiError::RateLimited).is_cancelled());
    }

    #[test]
    fn test_timeout_is_distinguished_from_cancellation() {
        let err = ReconcileError::Timeout {
            waiting_for: "deploy of srv-1 to go live".to_string(),
            elapsed_secs: 60,
        };
        assert!(err.is_timeout());
        assert!(!err.is_cancelled());
    }
}
