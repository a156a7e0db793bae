//! Error types for driver configuration

use thiserror::Error;

/// Result type for driver construction
pub type DriverResult<T> = Result<T, DriverError>;

/// Invalid driver configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Partition count must be positive when given explicitly
    #[error("partition count must be at least 1")]
    ZeroPartitions,

    /// Executor configuration was rejected while building the driver
    #[error(transparent)]
    Executor(#[from] converge_resilience::ConfigError),
}
