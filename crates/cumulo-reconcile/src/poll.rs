//! Generic blocking wait with a growing probe interval.
//!
//! The control plane's state transitions are asynchronous and
//! unpredictable in duration (seconds to hours), so waiting is a poll
//! with multiplicative interval growth under a ceiling. Intervals are
//! configuration, not constants, so tests can run with zero waits.

use crate::error::{ReconcileError, ReconcileResult};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Poll interval configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval before the second probe.
    pub initial_interval: Duration,
    /// Ceiling the interval grows toward.
    pub max_interval: Duration,
    /// Multiplicative growth factor applied after each sleep.
    pub growth_factor: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            growth_factor: 1.2,
        }
    }
}

impl PollConfig {
    /// A configuration with no inter-probe waits, for deterministic tests.
    #[must_use]
    pub fn no_wait() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            growth_factor: 1.0,
        }
    }
}

/// Repeatedly invokes a probe until it reports completion, returns an
/// error, or a timeout elapses.
#[derive(Debug, Clone)]
pub struct Poller {
    config: PollConfig,
    cancel: CancellationToken,
}

impl Poller {
    /// Create a poller observing the given cancellation token.
    #[must_use]
    pub fn new(config: PollConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Poll until `probe` reports done, errors, or `timeout` elapses.
    ///
    /// The probe is tri-state: `Ok(false)` keeps waiting, `Ok(true)`
    /// completes, and an error stops immediately — once a probe errors,
    /// no further probe calls are made. The inter-probe sleep observes
    /// the cancellation token and aborts with
    /// [`ReconcileError::Cancelled`], which is distinct from the
    /// deadline's [`ReconcileError::Timeout`].
    pub async fn wait<F, Fut>(
        &self,
        waiting_for: &str,
        timeout: Duration,
        mut probe: F,
    ) -> ReconcileResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ReconcileResult<bool>>,
    {
        let started = Instant::now();
        let mut interval = self.config.initial_interval;

        loop {
            if probe().await? {
                return Ok(());
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(ReconcileError::Timeout {
                    waiting_for: waiting_for.to_string(),
                    elapsed_secs: elapsed.as_secs(),
                });
            }

            debug!(
                waiting_for = %waiting_for,
                interval_ms = interval.as_millis() as u64,
                "not ready yet, sleeping before next probe"
            );
            tokio::select! {
                () = self.cancel.cancelled() => return Err(ReconcileError::Cancelled),
                () = tokio::time::sleep(interval) => {}
            }

            interval = interval
                .mul_f64(self.config.growth_factor)
                .min(self.config.max_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn no_wait_poller() -> Poller {
        Poller::new(PollConfig::no_wait(), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_done_on_first_probe_returns_without_sleeping() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        // A poller with a long interval: success on the first probe must
        // not reach the sleep at all.
        let poller = Poller::new(
            PollConfig {
                initial_interval: Duration::from_secs(60),
                ..Default::default()
            },
            CancellationToken::new(),
        );

        tokio::time::timeout(Duration::from_secs(1), async {
            poller
                .wait("first probe", Duration::from_secs(600), move || {
                    let calls = calls_clone.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(true)
                    }
                })
                .await
        })
        .await
        .expect("must not sleep")
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_timeout_with_never_done_probe_times_out() {
        let err = no_wait_poller()
            .wait("nothing", Duration::ZERO, || async { Ok(false) })
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_probe_error_stops_polling_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();

        let err = no_wait_poller()
            .wait("failing probe", Duration::from_secs(600), move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ReconcileError::DeployFailed {
                        deploy_id: "dep-1".to_string(),
                        status: "build_failed",
                    })
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::DeployFailed { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_during_sleep_is_not_a_timeout() {
        let cancel = CancellationToken::new();
        let poller = Poller::new(
            PollConfig {
                initial_interval: Duration::from_secs(60),
                ..Default::default()
            },
            cancel.clone(),
        );

        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel_clone.cancel();
        });

        let err = tokio::time::timeout(Duration::from_secs(2), async {
            poller
                .wait("cancelled wait", Duration::from_secs(600), || async {
                    Ok(false)
                })
                .await
        })
        .await
        .expect("cancellation must abort the sleep promptly")
        .unwrap_err();

        assert!(err.is_cancelled(), "got: {err:?}");
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_interval_grows_toward_ceiling() {
        // Pure math check on the growth rule the sleep loop applies.
        let config = PollConfig {
            initial_interval: Duration::from_secs(10),
            max_interval: Duration::from_secs(15),
            growth_factor: 1.2,
        };
        let grown = config
            .initial_interval
            .mul_f64(config.growth_factor)
            .min(config.max_interval);
        assert_eq!(grown, Duration::from_secs(12));

        let capped = grown
            .mul_f64(config.growth_factor)
            .min(config.max_interval)
            .mul_f64(config.growth_factor)
            .min(config.max_interval);
        assert_eq!(capped, Duration::from_secs(15));
    }
}
