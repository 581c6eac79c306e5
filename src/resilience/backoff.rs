//! Retry pacing for the event poller.

use rand::Rng;
use std::time::Duration;

use crate::config::RetryConfig;

/// Doubling delay between consecutive failures, capped and jittered.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    failures: u32,
}

impl Backoff {
    /// Start with no recorded failures.
    pub fn new(retry: &RetryConfig) -> Self {
        Self {
            base_ms: retry.base_delay_ms,
            max_ms: retry.max_delay_ms,
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait before the next attempt.
    ///
    /// The n-th consecutive failure waits `base * 2^(n-1)` capped at `max`,
    /// plus up to 10% jitter.
    pub fn next_delay(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);

        let shift = (self.failures - 1).min(63);
        let delay = self.base_ms.saturating_mul(1u64 << shift).min(self.max_ms);
        let jitter = rand::thread_rng().gen_range(0..=delay / 10);

        Duration::from_millis(delay.saturating_add(jitter))
    }

    /// Forget past failures after a successful attempt.
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
