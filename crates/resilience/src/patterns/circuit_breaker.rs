//! Trip-once circuit breaker owned by a single worker
//!
//! The breaker counts *exhausted* calls (calls that used every attempt and
//! still failed). Once the count reaches the configured threshold the circuit
//! opens and stays open for the rest of the owning worker's life: there is no
//! half-open probe and no reset. Individual successes do not reset the count.
//!
//! ```text
//! Closed ──(exhausted calls >= threshold)──▶ Open (terminal)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Circuit breaker state for runtime representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Circuit is closed - operations are allowed
    Closed,
    /// Circuit is open - operations are skipped
    Open,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
        }
    }
}

/// Per-worker breaker state. Not `Clone`: a copy would fork the failure count.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: Option<u32>,
    state: State,
    consecutive_exhausted: u32,
}

impl CircuitBreaker {
    /// Closed breaker that trips after `threshold` exhausted calls, or never
    #[must_use]
    pub const fn new(threshold: Option<u32>) -> Self {
        Self {
            threshold,
            state: State::Closed,
            consecutive_exhausted: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// `true` once the breaker has tripped
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, State::Open)
    }

    /// Exhausted calls recorded so far
    #[must_use]
    pub const fn consecutive_exhausted(&self) -> u32 {
        self.consecutive_exhausted
    }

    /// Record an exhausted call; returns `true` if this call tripped the circuit
    pub fn record_exhausted(&mut self, executor: &str) -> bool {
        self.consecutive_exhausted = self.consecutive_exhausted.saturating_add(1);

        match (self.state, self.threshold) {
            (State::Closed, Some(threshold)) if self.consecutive_exhausted >= threshold => {
                warn!(
                    executor,
                    exhausted = self.consecutive_exhausted,
                    threshold,
                    "Circuit breaker opening; this worker will skip every further call"
                );
                self.state = State::Open;
                true
            }
            _ => false,
        }
    }
}
