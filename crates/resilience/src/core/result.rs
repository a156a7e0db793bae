//! Outcome records returned by every executor call

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ExecutionError;

/// Why a call produced no value.
///
/// A skipped call made no attempts and has no error; an exhausted call made
/// at least one attempt and carries the last error. Deserialization rejects
/// any other combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExecutionInfo")]
pub struct ExecutionInfo {
    nb_attempt: u32,
    skipped: bool,
    last_error: Option<String>,
}

impl ExecutionInfo {
    /// Info for a call refused because the circuit was open
    #[must_use]
    pub const fn skipped() -> Self {
        Self {
            nb_attempt: 0,
            skipped: true,
            last_error: None,
        }
    }

    /// Info for a call that used all of its attempts
    pub fn exhausted(nb_attempt: u32, last_error: impl Into<String>) -> Self {
        Self {
            nb_attempt,
            skipped: false,
            last_error: Some(last_error.into()),
        }
    }

    /// Attempts actually made
    #[must_use]
    pub const fn nb_attempt(&self) -> u32 {
        self.nb_attempt
    }

    /// `true` when the operation was never invoked
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Message of the final failure, `None` for skipped calls
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Convert into the simple error form
    #[must_use]
    pub fn to_error(&self) -> ExecutionError {
        if self.skipped {
            ExecutionError::CircuitOpen
        } else {
            ExecutionError::Exhausted {
                attempts: self.nb_attempt,
                message: self.last_error.clone().unwrap_or_default(),
            }
        }
    }
}

/// Wire shape of [`ExecutionInfo`], checked on the way in.
#[derive(Deserialize)]
struct RawExecutionInfo {
    nb_attempt: u32,
    skipped: bool,
    last_error: Option<String>,
}

impl TryFrom<RawExecutionInfo> for ExecutionInfo {
    type Error = String;

    fn try_from(raw: RawExecutionInfo) -> Result<Self, Self::Error> {
        match (raw.skipped, raw.nb_attempt, raw.last_error) {
            (true, 0, None) => Ok(Self::skipped()),
            (true, _, _) => Err("a skipped call has no attempts and no error".to_string()),
            (false, 0, _) => Err("an exhausted call made at least one attempt".to_string()),
            (false, _, None) => Err("an exhausted call carries its last error".to_string()),
            (false, nb_attempt, Some(last_error)) => Ok(Self::exhausted(nb_attempt, last_error)),
        }
    }
}

impl fmt::Display for ExecutionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            return write!(f, "skipped (circuit open)");
        }
        write!(f, "failed after {} attempt(s)", self.nb_attempt)?;
        if let Some(err) = &self.last_error {
            write!(f, ": {err}")?;
        }
        Ok(())
    }
}

/// Outcome of a single executor call: a value, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionResult<T> {
    /// The operation produced a value
    Success(T),
    /// The operation was skipped or exhausted its attempts
    Unresolved(ExecutionInfo),
}

impl<T> ExecutionResult<T> {
    /// The fixed result returned while a circuit is open
    #[must_use]
    pub const fn skipped() -> Self {
        Self::Unresolved(ExecutionInfo::skipped())
    }

    /// `true` iff a value is present
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `true` iff the call was refused by an open circuit
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Unresolved(info) if info.skipped)
    }

    /// Borrow the value, if any
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Unresolved(_) => None,
        }
    }

    /// Borrow the failure info, if any
    #[must_use]
    pub const fn info(&self) -> Option<&ExecutionInfo> {
        match self {
            Self::Success(_) => None,
            Self::Unresolved(info) => Some(info),
        }
    }

    /// Drop attempt metadata and return a plain `Result`
    pub fn into_outcome(self) -> Result<T, ExecutionError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Unresolved(info) => Err(info.to_error()),
        }
    }

    /// Borrowing variant of [`into_outcome`](Self::into_outcome)
    pub fn as_outcome(&self) -> Result<&T, ExecutionError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Unresolved(info) => Err(info.to_error()),
        }
    }

    /// Map the success value, keeping failure info untouched
    pub fn map<U, F>(self, f: F) -> ExecutionResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => ExecutionResult::Success(f(value)),
            Self::Unresolved(info) => ExecutionResult::Unresolved(info),
        }
    }
}

impl<T> From<ExecutionResult<T>> for Result<T, ExecutionError> {
    fn from(result: ExecutionResult<T>) -> Self {
        result.into_outcome()
    }
}
