//! Retry policy and backoff calculation.

use std::time::Duration;

use ledgerlink_shared::RetrySettings;
use rand::Rng;

/// Retry policy configuration.
///
/// Attempt numbers are one-based: attempt 1 is the first call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first call included. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Upper bound for any delay before jitter is added.
    pub max_delay: Duration,
    /// Growth factor per attempt. Always at least 1.
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2,
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.base_delay_ms),
            Duration::from_millis(settings.max_delay_ms),
            settings.backoff_multiplier,
        )
    }
}

impl RetryPolicy {
    /// Creates a policy, clamping the attempt budget and multiplier to 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: u32,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier: backoff_multiplier.max(1),
        }
    }

    /// A policy that makes a single attempt.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, 1)
    }

    /// Delay to wait after `attempt` failed, before jitter.
    ///
    /// `min(base_delay * backoff_multiplier^(attempt - 1), max_delay)`
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.backoff_multiplier.saturating_pow(exponent);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay to wait after `attempt` failed, with jitter from `rng` added.
    pub fn delay_with_jitter<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let delay = self.backoff_delay(attempt);
        delay.saturating_add(jitter(delay, rng))
    }
}

/// Draws a jitter uniformly from `[0, delay / 10)`.
pub fn jitter<R: Rng>(delay: Duration, rng: &mut R) -> Duration {
    let bound = u64::try_from(delay.as_nanos() / 10).unwrap_or(u64::MAX);
    if bound == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(rng.random_range(0..bound))
}
