//! Driver configuration

use serde::{Deserialize, Serialize};

use converge_resilience::ExecutionResult;

use crate::error::{DriverError, DriverResult};

/// Which unresolved records a later pass re-runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryEligibility {
    /// Every record without a value, skipped or failed alike
    #[default]
    Unresolved,
    /// Only records whose call actually ran and failed; skipped records are
    /// carried forward untouched
    FailedOnly,
}

impl RetryEligibility {
    /// Whether a record holding `result` is re-run
    #[must_use]
    pub fn should_retry<T>(self, result: &ExecutionResult<T>) -> bool {
        match (self, result.info()) {
            (_, None) => false,
            (Self::Unresolved, Some(_)) => true,
            (Self::FailedOnly, Some(info)) => !info.is_skipped(),
        }
    }
}

/// What happens to records still unresolved after the last pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    /// The recovery function is accepted but never called
    #[default]
    Ignore,
    /// Call the recovery function for each unresolved record; a `Some` value
    /// becomes a success and is integrated like any other
    OnExhaustion,
}

/// Pass budget and partitioning for a [`ConvergenceDriver`](crate::ConvergenceDriver).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Passes allowed after pass 0
    pub max_passes: usize,
    /// Number of partitions; defaults to the rayon pool size
    pub partitions: Option<usize>,
    /// Retry eligibility policy
    pub eligibility: RetryEligibility,
    /// Recovery policy
    pub recovery: RecoveryMode,
}

impl DriverConfig {
    /// Config with `max_passes` extra passes and defaults elsewhere
    #[must_use]
    pub fn with_max_passes(max_passes: usize) -> Self {
        Self {
            max_passes,
            ..Self::default()
        }
    }

    /// Check invariants
    pub fn validate(&self) -> DriverResult<()> {
        if self.partitions == Some(0) {
            return Err(DriverError::ZeroPartitions);
        }
        Ok(())
    }

    /// Partition count for `items` inputs: never zero, never more than `items`
    #[must_use]
    pub fn partitions_for(&self, items: usize) -> usize {
        self.partitions
            .unwrap_or_else(rayon::current_num_threads)
            .min(items)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use converge_resilience::ExecutionInfo;
    use pretty_assertions::assert_eq;

    #[test]
    fn unresolved_eligibility_conflates_skip_and_failure() {
        let skipped = ExecutionResult::<()>::skipped();
        let failed = ExecutionResult::<()>::Unresolved(ExecutionInfo::exhausted(1, "x"));
        let ok = ExecutionResult::Success(());

        assert!(RetryEligibility::Unresolved.should_retry(&skipped));
        assert!(RetryEligibility::Unresolved.should_retry(&failed));
        assert!(!RetryEligibility::Unresolved.should_retry(&ok));

        assert!(!RetryEligibility::FailedOnly.should_retry(&skipped));
        assert!(RetryEligibility::FailedOnly.should_retry(&failed));
        assert!(!RetryEligibility::FailedOnly.should_retry(&ok));
    }

    #[test]
    fn partitions_are_capped_by_items() {
        let config = DriverConfig {
            partitions: Some(8),
            ..DriverConfig::default()
        };
        assert_eq!(config.partitions_for(3), 3);
        assert_eq!(config.partitions_for(0), 1);
        assert_eq!(config.partitions_for(100), 8);
    }

    #[test]
    fn zero_partitions_is_rejected() {
        let config = DriverConfig {
            partitions: Some(0),
            ..DriverConfig::default()
        };
        assert_eq!(config.validate(), Err(DriverError::ZeroPartitions));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: DriverConfig =
            serde_json::from_str(r#"{"max_passes":3,"eligibility":"failed_only"}"#).unwrap();
        assert_eq!(
            config,
            DriverConfig {
                max_passes: 3,
                partitions: None,
                eligibility: RetryEligibility::FailedOnly,
                recovery: RecoveryMode::Ignore,
            }
        );
    }
}
