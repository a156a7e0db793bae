//! Aggregable call-outcome counters

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::result::ExecutionResult;

/// Summary of a batch of call outcomes.
///
/// Field-wise addition makes this a commutative monoid with
/// [`ExecMetrics::ZERO`] as identity, so partial summaries computed on
/// different partitions can be combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecMetrics {
    /// Calls that produced a value
    pub success: u64,
    /// Calls refused by an open circuit
    pub skipped: u64,
    /// Calls that exhausted their attempts
    pub failed: u64,
    /// Attempts spent by failed calls
    pub total_attempts: u64,
}

impl ExecMetrics {
    /// The identity element
    pub const ZERO: Self = Self {
        success: 0,
        skipped: 0,
        failed: 0,
        total_attempts: 0,
    };

    /// Metrics contributed by a single call outcome.
    ///
    /// Only failed calls report attempts; a success carries no attempt
    /// metadata and a skipped call made none.
    #[must_use]
    pub fn from_result<T>(result: &ExecutionResult<T>) -> Self {
        match result {
            ExecutionResult::Success(_) => Self {
                success: 1,
                ..Self::ZERO
            },
            ExecutionResult::Unresolved(info) if info.is_skipped() => Self {
                skipped: 1,
                ..Self::ZERO
            },
            ExecutionResult::Unresolved(info) => Self {
                failed: 1,
                total_attempts: u64::from(info.nb_attempt()),
                ..Self::ZERO
            },
        }
    }

    /// Field-wise sum; the same operation as `+`
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        Self {
            success: self.success + other.success,
            skipped: self.skipped + other.skipped,
            failed: self.failed + other.failed,
            total_attempts: self.total_attempts + other.total_attempts,
        }
    }

    /// No skipped and no failed calls
    #[must_use]
    pub const fn is_pure_success(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }

    /// Number of outcomes summarised
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.success + self.skipped + self.failed
    }

    /// Outcomes without a value
    #[must_use]
    pub const fn unresolved(&self) -> u64 {
        self.skipped + self.failed
    }
}

impl Add for ExecMetrics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(rhs)
    }
}

impl AddAssign for ExecMetrics {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.combine(rhs);
    }
}

impl Sum for ExecMetrics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::combine)
    }
}

impl<'a> Sum<&'a Self> for ExecMetrics {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for ExecMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "success={} skipped={} failed={} attempts={}",
            self.success, self.skipped, self.failed, self.total_attempts
        )
    }
}
