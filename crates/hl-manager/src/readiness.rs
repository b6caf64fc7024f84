//! Waiting for a freshly started daemon to answer
//!
//! A spawned daemon takes a moment before it accepts connections. Callers
//! poll its liveness with exponential backoff, bounded by a timeout and a
//! cancellation token so shutdown never waits on a daemon that won't come up.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use hl_core::config::{BackoffConfig, ReadinessConfig};

/// Why a readiness wait ended without the daemon answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessError {
    /// Gave up after the configured timeout
    TimedOut(Duration),
    /// Cancellation token fired
    Cancelled,
}

/// Exponential backoff with jitter between readiness polls
pub struct ExponentialBackoff {
    /// Current delay
    current: Duration,
    /// Maximum delay
    max: Duration,
    /// Multiplier
    multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    jitter: f64,
}

impl ExponentialBackoff {
    /// Create a new backoff from configuration
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(config.initial, config.max, config.multiplier, config.jitter)
    }

    /// Create a new backoff with custom parameters
    pub fn new(initial: Duration, max: Duration, multiplier: f64, jitter: f64) -> Self {
        Self {
            current: initial,
            max,
            multiplier,
            jitter: if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) },
        }
    }

    /// Get the next delay and advance the backoff
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;

        // Negative, non-finite or overflowing products saturate at max
        let next = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max);
        self.current = std::cmp::min(next, self.max);

        if self.jitter == 0.0 {
            return delay;
        }
        let jitter_amount = delay.as_secs_f64() * self.jitter * rand::random::<f64>();
        delay + Duration::try_from_secs_f64(jitter_amount).unwrap_or_default()
    }
}

/// Poll `check` until it returns true.
///
/// Returns the number of polls it took. Fails with
/// [`ReadinessError::TimedOut`] once `config.timeout` elapses and with
/// [`ReadinessError::Cancelled`] as soon as `cancel` fires.
pub async fn wait_until_ready<F, Fut>(
    mut check: F,
    config: &ReadinessConfig,
    cancel: &CancellationToken,
) -> Result<u32, ReadinessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut backoff = ExponentialBackoff::from_config(&config.backoff);

    let poll = async {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            if check().await {
                return attempts;
            }
            tokio::time::sleep(backoff.next_delay()).await;
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => Err(ReadinessError::Cancelled),
        result = tokio::time::timeout(config.timeout, poll) => {
            result.map_err(|_| ReadinessError::TimedOut(config.timeout))
        }
    }
}
