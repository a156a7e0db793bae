//! Error types for executor configuration and call outcomes

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid executor configuration.
///
/// Returned by [`ExecutorConfigBuilder::build`](crate::ExecutorConfigBuilder::build)
/// and by deserialization of [`ExecutorConfig`](crate::ExecutorConfig). No
/// executor can be constructed from a configuration that fails validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The executor name is missing or blank
    #[error("executor name is required and must not be blank")]
    MissingName,

    /// A field holds a value outside its accepted range
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create an [`ConfigError::InvalidValue`] for `field`
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Simple success/failure form of an unresolved call.
///
/// Produced by [`ExecutionResult::into_outcome`](crate::ExecutionResult::into_outcome)
/// for callers that do not need attempt metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The worker's circuit was open, so the operation was never invoked
    #[error("circuit breaker is open; operation was skipped")]
    CircuitOpen,

    /// Every attempt failed
    #[error("{message}")]
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// Message of the final failure
        message: String,
    },
}

impl ExecutionError {
    /// Whether this error stands for a skipped call
    #[must_use]
    pub const fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen)
    }
}
