//! Throttling retry policy for 429 responses.
//!
//! The control plane signals throttling with HTTP 429 and, usually, a
//! `Retry-After` header. That header is authoritative, so it is honored
//! first; if the response after that single honored wait is still 429 (or
//! the header was absent or unparseable), the client walks a fixed backoff
//! ladder. The rungs are deliberately small-then-large: quick recovery from
//! brief throttling windows, capped worst-case latency.

use std::time::Duration;

/// The fixed backoff ladder, in seconds.
pub const BACKOFF_LADDER_SECS: [u64; 7] = [1, 5, 10, 20, 40, 60, 120];

/// Retry policy applied to 429 responses only. Transport errors and every
/// other status are never retried by the client.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Backoff ladder walked after the `Retry-After` wait (or immediately
    /// when the header is absent). Each rung is slept once, in order.
    pub backoff_ladder: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_ladder: BACKOFF_LADDER_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a custom ladder.
    #[must_use]
    pub fn new(backoff_ladder: Vec<Duration>) -> Self {
        Self { backoff_ladder }
    }

    /// A policy with the default number of rungs but zero-length sleeps.
    /// Keeps request-count semantics intact while letting tests run
    /// without waiting.
    #[must_use]
    pub fn no_wait() -> Self {
        Self {
            backoff_ladder: vec![Duration::ZERO; BACKOFF_LADDER_SECS.len()],
        }
    }
}

/// Parse a `Retry-After` header value as a whole number of seconds.
///
/// HTTP-date forms are not parsed; they fall through to the backoff
/// ladder.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ladder_values() {
        let policy = RetryPolicy::default();
        let secs: Vec<u64> = policy.backoff_ladder.iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![1, 5, 10, 20, 40, 60, 120]);
    }

    #[test]
    fn test_no_wait_keeps_rung_count() {
        let policy = RetryPolicy::no_wait();
        assert_eq!(policy.backoff_ladder.len(), BACKOFF_LADDER_SECS.len());
        assert!(policy.backoff_ladder.iter().all(|d| d.is_zero()));
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(parse_retry_after("10"), Some(Duration::from_secs(10)));
        assert_eq!(parse_retry_after("0"), Some(Duration::ZERO));
    }

    #[test]
    fn test_parse_retry_after_rejects_non_seconds() {
        assert_eq!(parse_retry_after(""), None);
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }
}
