//! # Converge Resilience
//!
//! Bounded-retry execution of a single fallible operation, guarded by a
//! per-worker circuit breaker and an optional minimum-interval throttle.
//!
//! ## Features
//!
//! - **Bounded retry**: a fixed attempt budget per call with an optional fixed
//!   delay between tries
//! - **Circuit breaker**: trips after N consecutive exhausted calls and then
//!   skips every further call on that worker
//! - **Rate limiting**: minimum wall-clock spacing between invocations on one
//!   worker (no burst allowance)
//! - **Outcome records**: [`ExecutionResult`] tells "never tried" apart from
//!   "tried and failed"; [`ExecMetrics`] aggregates them
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use converge_resilience::prelude::*;
//!
//! let config = ExecutorConfig::builder("geocoder")
//!     .attempt(3)
//!     .backoff(Duration::from_millis(5))
//!     .break_after_n_failure(10)
//!     .build()?;
//! let executor = Executor::new(config);
//!
//! // One worker per thread of control; it owns the breaker state.
//! let mut worker = executor.worker();
//! let result = worker.run(|| "52.37,4.89".parse::<String>());
//!
//! let metrics = ExecMetrics::from_result(&result);
//! assert!(metrics.is_pure_success());
//! # Ok::<(), ConfigError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

// Core module with fundamental types
pub mod core;

// Pattern implementations
pub mod patterns;

mod executor;

pub use executor::{Executor, Worker, WorkerStats};

// Public API - core types
pub use crate::core::{
    ConfigError, ConfigResult, ExecMetrics, ExecutionError, ExecutionInfo, ExecutionResult,
    ExecutorConfig, ExecutorConfigBuilder,
};

pub use patterns::CircuitState;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        ConfigError, ExecMetrics, ExecutionError, ExecutionInfo, ExecutionResult, ExecutorConfig,
    };
    pub use crate::patterns::CircuitState;
    pub use crate::{Executor, Worker, WorkerStats};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
