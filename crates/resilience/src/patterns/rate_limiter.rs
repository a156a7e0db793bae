//! Minimum-interval throttle for a single worker
//!
//! Not a token bucket: there is no burst allowance. Each invocation is
//! followed by a blocking sleep long enough that consecutive invocation
//! starts on the same worker are at least `min_interval` apart.

use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

/// Blocking minimum-interval throttle.
#[derive(Debug)]
pub struct MinIntervalThrottle {
    min_interval: Duration,
    last_call_start: Option<Instant>,
}

impl MinIntervalThrottle {
    /// Throttle spacing invocations by `min_interval`
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call_start: None,
        }
    }

    /// Configured spacing
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Start time of the most recent invocation
    #[must_use]
    pub const fn last_call_start(&self) -> Option<Instant> {
        self.last_call_start
    }

    /// Mark the start of an invocation
    pub fn begin(&mut self) {
        self.last_call_start = Some(Instant::now());
    }

    /// Block until `min_interval` has elapsed since [`begin`](Self::begin).
    ///
    /// Returns how long the calling thread slept.
    pub fn finish(&mut self) -> Duration {
        let Some(start) = self.last_call_start else {
            return Duration::ZERO;
        };

        let remaining = self.min_interval.saturating_sub(start.elapsed());
        if !remaining.is_zero() {
            trace!(sleep_ms = remaining.as_millis(), "Throttling worker");
            thread::sleep(remaining);
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_never_sleeps() {
        let mut throttle = MinIntervalThrottle::new(Duration::ZERO);
        throttle.begin();
        assert_eq!(throttle.finish(), Duration::ZERO);
        assert!(throttle.last_call_start().is_some());
    }

    #[test]
    fn finish_without_begin_does_not_sleep() {
        let mut throttle = MinIntervalThrottle::new(Duration::from_secs(5));
        assert_eq!(throttle.finish(), Duration::ZERO);
    }

    #[test]
    fn finish_pads_fast_invocations_up_to_the_interval() {
        let mut throttle = MinIntervalThrottle::new(Duration::from_millis(30));
        let started = Instant::now();
        throttle.begin();
        let slept = throttle.finish();

        assert!(slept > Duration::ZERO);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn slow_invocations_are_not_padded() {
        let mut throttle = MinIntervalThrottle::new(Duration::from_millis(5));
        throttle.begin();
        thread::sleep(Duration::from_millis(10));
        assert_eq!(throttle.finish(), Duration::ZERO);
    }
}
