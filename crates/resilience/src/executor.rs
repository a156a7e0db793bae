//! Bounded retry executor with a per-worker circuit breaker
//!
//! An [`Executor`] is cheap to clone and shares one immutable
//! [`ExecutorConfig`]. Mutable state (breaker, throttle) lives in a
//! [`Worker`], which is handed to exactly one concurrency unit and never
//! shared: the circuit breaker is race-free because nothing else can see it.
//!
//! ```
//! use converge_resilience::{Executor, ExecutorConfig};
//!
//! let executor = Executor::new(ExecutorConfig::builder("lookup").attempt(3).build()?);
//! let mut worker = executor.worker();
//!
//! let mut calls = 0;
//! let result = worker.run(|| {
//!     calls += 1;
//!     if calls < 2 { Err("not yet") } else { Ok(calls) }
//! });
//! assert_eq!(result.into_outcome(), Ok(2));
//! # Ok::<(), converge_resilience::ConfigError>(())
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use serde::Serialize;
use tracing::{debug, trace};

use crate::core::{ConfigResult, ExecutionInfo, ExecutionResult, ExecutorConfig};
use crate::patterns::{CircuitBreaker, CircuitState, MinIntervalThrottle, RetryPolicy};

/// Shared, immutable executor description.
#[derive(Debug, Clone)]
pub struct Executor {
    config: Arc<ExecutorConfig>,
}

impl Executor {
    /// Wrap a validated configuration
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Validate `config` again and wrap it
    pub fn try_new(config: ExecutorConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Executor configuration
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Executor label
    #[must_use]
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Create a fresh worker: closed circuit, zero counters, no timing state
    #[must_use]
    pub fn worker(&self) -> Worker {
        Worker {
            config: Arc::clone(&self.config),
            retry: RetryPolicy::from_config(&self.config),
            breaker: CircuitBreaker::new(self.config.break_after_n_failure()),
            throttle: self.config.min_interval().map(MinIntervalThrottle::new),
            stats: WorkerStats::default(),
        }
    }
}

/// Counters describing what one worker has done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// Calls to [`Worker::run`]
    pub calls: u64,
    /// Times the wrapped operation was actually invoked
    pub invocations: u64,
    /// Calls that returned a value
    pub successes: u64,
    /// Calls that used every attempt and failed
    pub exhausted: u64,
    /// Calls refused by the open circuit
    pub skipped: u64,
}

/// Per-worker executor state.
///
/// Deliberately neither `Clone` nor `Sync`-shared: give each thread of
/// control its own worker via [`Executor::worker`].
pub struct Worker {
    config: Arc<ExecutorConfig>,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
    throttle: Option<MinIntervalThrottle>,
    stats: WorkerStats,
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("executor", &self.config.name())
            .field("circuit", &self.breaker.state())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Worker {
    /// Run `operation` with bounded retries.
    ///
    /// Never panics on behalf of `operation`: an `Err` or a panic both count
    /// as a failed try. While the circuit is open the operation is not
    /// invoked and [`ExecutionResult::skipped`] is returned.
    #[tracing::instrument(level = "trace", skip_all, fields(
        executor = %self.config.name(),
        max_attempts = self.retry.max_attempts(),
    ))]
    pub fn run<T, E, F>(&mut self, mut operation: F) -> ExecutionResult<T>
    where
        F: FnMut() -> Result<T, E>,
        E: fmt::Display,
    {
        self.stats.calls += 1;

        if self.breaker.is_open() {
            trace!("Circuit open, skipping call");
            self.stats.skipped += 1;
            return ExecutionResult::skipped();
        }

        let mut attempts = 0_u32;
        loop {
            attempts += 1;

            if let Some(throttle) = self.throttle.as_mut() {
                throttle.begin();
            }
            let outcome = invoke(&mut operation);
            self.stats.invocations += 1;
            if let Some(throttle) = self.throttle.as_mut() {
                throttle.finish();
            }

            let message = match outcome {
                Ok(value) => {
                    self.stats.successes += 1;
                    return ExecutionResult::Success(value);
                }
                Err(message) => message,
            };

            if self.retry.can_retry(attempts) {
                debug!(attempt = attempts, error = %message, "Attempt failed, retrying");
                if let Some(delay) = self.retry.delay_before(attempts) {
                    thread::sleep(delay);
                }
                continue;
            }

            debug!(attempts, error = %message, "All attempts exhausted");
            self.stats.exhausted += 1;
            self.breaker.record_exhausted(self.config.name());
            return ExecutionResult::Unresolved(ExecutionInfo::exhausted(attempts, message));
        }
    }

    /// Current circuit state
    #[must_use]
    pub const fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Exhausted calls seen by this worker
    #[must_use]
    pub const fn consecutive_exhausted(&self) -> u32 {
        self.breaker.consecutive_exhausted()
    }

    /// Snapshot of this worker's counters
    #[must_use]
    pub const fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// Executor configuration
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

/// Invoke once, turning an `Err` or a panic into the failure message.
fn invoke<T, E, F>(operation: &mut F) -> Result<T, String>
where
    F: FnMut() -> Result<T, E>,
    E: fmt::Display,
{
    match panic::catch_unwind(AssertUnwindSafe(|| operation())) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(error.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("operation panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("operation panicked: {message}")
    } else {
        "operation panicked".to_string()
    }
}
