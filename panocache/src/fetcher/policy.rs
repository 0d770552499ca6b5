//! Retry policy for tile downloads.
//!
//! Only transient failures (transport errors, HTTP 5xx, HTTP 429) are retried;
//! the fetcher decides which failures are transient and asks the policy how
//! long to wait before the next attempt.

use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default delay between attempts (1 second).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// How a tile download handles transient failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// No retries - fail immediately on error.
    None,

    /// Fixed number of attempts with constant delay between them.
    Fixed {
        /// Maximum number of attempts (including the initial attempt).
        max_attempts: u32,
        /// Delay between retry attempts.
        delay: Duration,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::retries(DEFAULT_MAX_RETRIES, Duration::from_millis(DEFAULT_RETRY_DELAY_MS))
    }
}

impl RetryPolicy {
    /// Creates a fixed retry policy.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Maximum number of attempts (including initial)
    /// * `delay` - Fixed delay between attempts
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::Fixed {
            max_attempts,
            delay,
        }
    }

    /// Creates a policy allowing `retries` attempts after the first one.
    ///
    /// Zero retries yields [`RetryPolicy::None`].
    pub fn retries(retries: u32, delay: Duration) -> Self {
        if retries == 0 {
            Self::None
        } else {
            Self::fixed(retries.saturating_add(1), delay)
        }
    }

    /// Calculates the delay for a given attempt number.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt that just failed (1-based)
    ///
    /// # Returns
    ///
    /// The delay to wait before the next attempt, or `None` if no more
    /// attempts are allowed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed {
                max_attempts,
                delay,
            } => {
                if attempt < *max_attempts {
                    Some(*delay)
                } else {
                    None
                }
            }
        }
    }

    /// Returns the maximum number of attempts for this policy.
    pub fn max_attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { max_attempts, .. } => (*max_attempts).max(1),
        }
    }
}
