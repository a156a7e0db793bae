//! Bounded retry policy
//!
//! A call gets a fixed budget of attempts. Between attempts the worker may
//! sleep a fixed backoff. The exponential flag is carried for configuration
//! compatibility only; delays never grow.

use std::time::Duration;

use crate::core::ExecutorConfig;

/// Attempt budget and inter-attempt delay for one executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Option<Duration>,
    exponential: bool,
}

impl RetryPolicy {
    /// Policy allowing `max_attempts` tries (at least one)
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: None,
            exponential: false,
        }
    }

    /// Policy described by an executor configuration
    #[must_use]
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            max_attempts: config.attempt(),
            backoff: config.backoff(),
            exponential: config.exponential_backoff(),
        }
    }

    /// Total attempts per call
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether the exponential flag was set (it does not affect delays)
    #[must_use]
    pub const fn exponential(&self) -> bool {
        self.exponential
    }

    /// Whether another try is allowed after `attempts_made` failures
    #[must_use]
    pub const fn can_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// Delay to sleep before retry number `retry` (1-based).
    ///
    /// Every retry uses the same delay.
    #[must_use]
    pub const fn delay_before(&self, _retry: u32) -> Option<Duration> {
        self.backoff
    }
}
