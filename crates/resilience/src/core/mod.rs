//! Core value types: configuration, outcomes, metrics and errors

mod config;
mod error;
mod metrics;
mod result;

pub use config::{ExecutorConfig, ExecutorConfigBuilder};
pub use error::{ConfigError, ConfigResult, ExecutionError};
pub use metrics::ExecMetrics;
pub use result::{ExecutionInfo, ExecutionResult};

/// Core constants
pub mod constants {
    /// Attempts per call when the configuration does not say otherwise
    pub const DEFAULT_ATTEMPTS: u32 = 1;
}
