//! Process-wide request rate limiting.
//!
//! The control plane enforces its quota per API credential, not per
//! resource, so one [`RateLimiter`] is shared (via `Arc`) by every client
//! created for a credential. Admission is a token bucket: a steady refill
//! rate plus a burst allowance.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Configuration for the shared rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Steady-state requests per second.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Burst size: requests admitted immediately from a full bucket.
    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_burst() -> u32 {
    10
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

impl RateLimitConfig {
    /// Create a config with a custom steady rate.
    #[must_use]
    pub fn new(requests_per_second: u32, burst: u32) -> Self {
        Self {
            enabled: true,
            requests_per_second,
            burst,
        }
    }

    /// Disable rate limiting.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Token bucket state.
struct TokenBucket {
    tokens: f64,
    max_tokens: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(refill_rate: u32, burst: u32) -> Self {
        Self {
            tokens: f64::from(burst),
            max_tokens: f64::from(burst),
            refill_rate: f64::from(refill_rate),
            last_refill: Instant::now(),
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_secs_f64() * self.refill_rate;
        self.tokens = (self.tokens + new_tokens).min(self.max_tokens);
        self.last_refill = now;
    }

    /// Try to take a token. Returns the wait until one is available.
    fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let tokens_needed = 1.0 - self.tokens;
            let wait_secs = tokens_needed / self.refill_rate;
            Err(Duration::from_secs_f64(wait_secs))
        }
    }
}

/// Token-bucket rate limiter safe for concurrent callers.
pub struct RateLimiter {
    config: RateLimitConfig,
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Create a limiter with the given configuration.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let bucket = Mutex::new(TokenBucket::new(config.requests_per_second, config.burst));
        Self { config, bucket }
    }

    /// Create a limiter that admits every request immediately.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(RateLimitConfig::disabled())
    }

    /// Block until the bucket admits one request.
    ///
    /// The wait observes `cancel`: if the caller's cancellation signal
    /// fires first, [`ApiError::Cancelled`] is returned and no token is
    /// consumed.
    pub async fn acquire(&self, cancel: &CancellationToken) -> ApiResult<()> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        if !self.config.enabled {
            return Ok(());
        }

        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                bucket.try_acquire().err()
            };

            match wait {
                None => {
                    trace!("rate limit token acquired");
                    return Ok(());
                }
                Some(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "rate limited, waiting for token");
                    tokio::select! {
                        () = cancel.cancelled() => return Err(ApiError::Cancelled),
                        () = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
    }
}
