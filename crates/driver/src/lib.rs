//! # Converge Driver
//!
//! Applies a fallible operation across a partitioned collection in passes.
//! Pass 0 runs every item; each later pass re-runs only the items that have
//! not produced a value yet, until everything resolves or the pass budget is
//! spent. Every input always yields exactly one output.
//!
//! Each partition owns one [`Worker`](converge_resilience::Worker) for the
//! whole run, so circuit breaking and throttling are per partition.
//!
//! ```rust
//! use converge_driver::run_convergence;
//! use converge_resilience::{Executor, ExecutorConfig};
//!
//! let executor = Executor::new(ExecutorConfig::builder("square").attempt(2).build()?);
//! let outputs = run_convergence(
//!     vec![1_u64, 2, 3],
//!     |x| if *x == 0 { Err("zero") } else { Ok(x * x) },
//!     |_, result| result.map(|v| *v).unwrap_or_default(),
//!     3,
//!     &executor,
//!     None,
//! );
//! assert_eq!(outputs, vec![1, 4, 9]);
//! # Ok::<(), converge_resilience::ConfigError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod record;

mod driver;

pub use config::{DriverConfig, RecoveryMode, RetryEligibility};
pub use dataset::Dataset;
pub use driver::{
    Checkpoint, ConvergenceDriver, ConvergenceReport, NoCheckpoint, PassReport, Recover,
    run_convergence,
};
pub use error::{DriverError, DriverResult};
pub use record::WorkRecord;
