//! Retry policy for the compare-and-swap loop

use std::time::Duration;

use rand::Rng;

/// Bounds on the optimistic retry loop
///
/// Whichever limit is hit first ends the loop with a contention error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    /// Wall-clock budget for the whole operation
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 16,
            base_backoff: Duration::from_millis(2),
            max_backoff: Duration::from_millis(100),
            timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, after `failed_attempts` conflicts
    ///
    /// Exponential in the attempt count, capped at `max_backoff`, then
    /// jittered into `[cap/2, cap]` so racing writers spread out.
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let shift = failed_attempts.saturating_sub(1).min(16);
        let ceiling = self
            .base_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff);

        let micros = ceiling.as_micros() as u64;
        if micros == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::thread_rng().gen_range(micros / 2..=micros))
    }
}
