//! Retry policy and response classification for outbound webhooks.

use std::time::Duration;

use rand::RngExt;

/// Upper bound (exclusive) of the random delay added to every backoff.
pub const MAX_JITTER: Duration = Duration::from_millis(1000);

/// Delivery tuning, built once from configuration and shared read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total sends allowed per delivery, counted across sweeps.
    pub max_retries: u32,
    /// Backoff before the first retry; doubled for each further retry.
    pub initial_delay: Duration,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Exclusive upper bound of the random jitter.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(10),
            max_jitter: MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the delay before retry `retry` (0 for the first retry).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }

    /// Uniform in `[0, max_jitter)`.
    pub fn jitter(&self) -> Duration {
        let bound = self.max_jitter.as_millis() as u64;
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..bound))
    }

    /// Full sleep before retry `retry`.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.backoff(retry) + self.jitter()
    }

    pub fn allows_another_attempt(&self, attempts: u32) -> bool {
        attempts < self.max_retries
    }

    /// How long a `pending` log may go without an update before its run is
    /// presumed dead. Twice the longest gap a live run leaves between writes:
    /// the last backoff with full jitter followed by a timed-out send.
    pub fn lease(&self) -> Duration {
        let longest_gap = self.backoff(self.max_retries.saturating_sub(2))
            + self.max_jitter
            + self.timeout;
        longest_gap.saturating_mul(2)
    }
}

/// How a subscriber's HTTP status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    /// Retrying cannot help: the endpoint refused or no longer exists.
    Permanent,
    Retryable,
}

pub fn classify_status(status: u16) -> ResponseClass {
    match status {
        200..=299 => ResponseClass::Success,
        401 | 403 | 410 => ResponseClass::Permanent,
        _ => ResponseClass::Retryable,
    }
}
