//! Rate-limit backoff for chat API calls.
//!
//! Each generation runs under the season's per-call timeout, so waiting
//! longer than that window only burns a round slot. The schedule here is
//! sized from the timeout: the waits of one call never add up to more than
//! half of it, leaving the other half for the request that follows.

use std::time::Duration;

/// Shortest first wait, however tight the call timeout
const MIN_FIRST_WAIT: Duration = Duration::from_millis(100);
/// Longest first wait, however generous the call timeout
const MAX_FIRST_WAIT: Duration = Duration::from_secs(2);

/// Doubling waits after HTTP 429, bounded by a total budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitBackoff {
    /// Retries after the first attempt
    pub retries: u32,
    /// Wait before the first retry
    pub first_wait: Duration,
    /// Total waiting allowed across all retries of one call
    pub budget: Duration,
}

impl RateLimitBackoff {
    /// Schedule that fits inside one call timeout
    pub fn within(call_timeout: Duration) -> Self {
        Self {
            retries: 3,
            first_wait: (call_timeout / 20).clamp(MIN_FIRST_WAIT, MAX_FIRST_WAIT),
            budget: call_timeout / 2,
        }
    }

    /// Never retry
    pub fn disabled() -> Self {
        Self {
            retries: 0,
            first_wait: Duration::ZERO,
            budget: Duration::ZERO,
        }
    }

    /// Wait before retry number `retry` (from 0), given how long this call
    /// has already waited. `None` means give up and report the rate limit.
    pub fn next_wait(&self, retry: u32, waited: Duration) -> Option<Duration> {
        if retry >= self.retries {
            return None;
        }
        let left = self.budget.checked_sub(waited).filter(|d| !d.is_zero())?;
        let wait = self.first_wait.saturating_mul(1 << retry.min(16));
        Some(wait.min(left))
    }
}
