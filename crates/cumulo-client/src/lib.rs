//! HTTP client for the Cumulo control plane.
//!
//! This crate provides the single path every control-plane request takes:
//!
//! 1. Token-bucket rate limiter admission (process-wide, shared per
//!    credential, cancellable).
//! 2. The request itself, via `reqwest`.
//! 3. `Retry-After`-aware retry of 429 responses, falling back to a fixed
//!    backoff ladder.
//! 4. Uniform response classification into the [`ApiError`] taxonomy.
//!
//! Callers never branch on raw status codes; they match on [`ApiError`]
//! variants. Transport-level failures (DNS, connection, timeout) are never
//! retried here — only HTTP-level throttling is.

pub mod client;
pub mod error;
pub mod limit;
pub mod retry;

pub use client::{ApiClient, ClientConfig};
pub use error::{ApiError, ApiResult};
pub use limit::{RateLimitConfig, RateLimiter};
pub use retry::RetryPolicy;
