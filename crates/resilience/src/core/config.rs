//! Executor configuration, its fluent builder and validation

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_ATTEMPTS;
use super::error::{ConfigError, ConfigResult};

/// Immutable, validated executor configuration.
///
/// Build one with [`ExecutorConfig::builder`] or deserialize it; both paths
/// run the same validation, so holding an `ExecutorConfig` means it is usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExecutorConfig", into = "RawExecutorConfig")]
pub struct ExecutorConfig {
    name: String,
    attempt: u32,
    backoff: Option<Duration>,
    exponential_backoff: bool,
    break_after_n_failure: Option<u32>,
    rate_limit_per_seconds: Option<u32>,
}

impl ExecutorConfig {
    /// Start building a configuration labelled `name`
    pub fn builder(name: impl Into<String>) -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::new().name(name)
    }

    /// Identity/label of the executor
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total attempts per call, always at least one
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Fixed delay slept before each retry
    #[must_use]
    pub const fn backoff(&self) -> Option<Duration> {
        self.backoff
    }

    /// Recorded for compatibility; retries always use the fixed backoff.
    #[must_use]
    pub const fn exponential_backoff(&self) -> bool {
        self.exponential_backoff
    }

    /// Consecutive exhausted calls after which a worker's circuit trips
    #[must_use]
    pub const fn break_after_n_failure(&self) -> Option<u32> {
        self.break_after_n_failure
    }

    /// Cap on invocations per second for a single worker
    #[must_use]
    pub const fn rate_limit_per_seconds(&self) -> Option<u32> {
        self.rate_limit_per_seconds
    }

    /// Minimum spacing between invocations on one worker, if rate limited.
    ///
    /// Truncated to whole milliseconds, so rates above 1000/s impose no delay.
    #[must_use]
    pub fn min_interval(&self) -> Option<Duration> {
        self.rate_limit_per_seconds
            .map(|rate| Duration::from_millis(1000 / u64::from(rate)))
    }

    /// Re-check every invariant
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingName);
        }
        if self.attempt == 0 {
            return Err(ConfigError::invalid("attempt", "must be at least 1"));
        }
        if self.break_after_n_failure == Some(0) {
            return Err(ConfigError::invalid(
                "break_after_n_failure",
                "must be at least 1 when set",
            ));
        }
        if self.rate_limit_per_seconds == Some(0) {
            return Err(ConfigError::invalid(
                "rate_limit_per_seconds",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`ExecutorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfigBuilder {
    name: Option<String>,
    attempt: Option<u32>,
    backoff: Option<Duration>,
    exponential_backoff: bool,
    break_after_n_failure: Option<u32>,
    rate_limit_per_seconds: Option<u32>,
}

impl ExecutorConfigBuilder {
    /// Empty builder; a name must be supplied before [`build`](Self::build)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the executor label
    #[must_use = "builder methods must be chained or built"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Total attempts per call; `0` is raised to `1`
    #[must_use = "builder methods must be chained or built"]
    pub const fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Fixed delay before each retry
    #[must_use = "builder methods must be chained or built"]
    pub const fn backoff(mut self, delay: Duration) -> Self {
        self.backoff = Some(delay);
        self
    }

    /// Record the exponential-backoff flag
    #[must_use = "builder methods must be chained or built"]
    pub const fn exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Trip a worker's circuit after `n` consecutive exhausted calls
    #[must_use = "builder methods must be chained or built"]
    pub const fn break_after_n_failure(mut self, n: u32) -> Self {
        self.break_after_n_failure = Some(n);
        self
    }

    /// Limit each worker to `per_second` invocations per second
    #[must_use = "builder methods must be chained or built"]
    pub const fn rate_limit_per_seconds(mut self, per_second: u32) -> Self {
        self.rate_limit_per_seconds = Some(per_second);
        self
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> ConfigResult<ExecutorConfig> {
        let name = self.name.ok_or(ConfigError::MissingName)?;
        let requested = self.attempt.unwrap_or(DEFAULT_ATTEMPTS);
        if requested == 0 {
            tracing::debug!(executor = %name, "attempt of 0 raised to 1");
        }

        let config = ExecutorConfig {
            name,
            attempt: requested.max(1),
            backoff: self.backoff,
            exponential_backoff: self.exponential_backoff,
            break_after_n_failure: self.break_after_n_failure,
            rate_limit_per_seconds: self.rate_limit_per_seconds,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Wire shape of [`ExecutorConfig`]; converted through the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawExecutorConfig {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    attempt: Option<u32>,
    #[serde(default)]
    #[cfg_attr(feature = "humantime", serde(with = "humantime_serde"))]
    backoff: Option<Duration>,
    #[serde(default)]
    exponential_backoff: bool,
    #[serde(default)]
    break_after_n_failure: Option<u32>,
    #[serde(default)]
    rate_limit_per_seconds: Option<u32>,
}

impl TryFrom<RawExecutorConfig> for ExecutorConfig {
    type Error = ConfigError;

    fn try_from(raw: RawExecutorConfig) -> ConfigResult<Self> {
        ExecutorConfigBuilder {
            name: raw.name,
            attempt: raw.attempt,
            backoff: raw.backoff,
            exponential_backoff: raw.exponential_backoff,
            break_after_n_failure: raw.break_after_n_failure,
            rate_limit_per_seconds: raw.rate_limit_per_seconds,
        }
        .build()
    }
}

impl From<ExecutorConfig> for RawExecutorConfig {
    fn from(config: ExecutorConfig) -> Self {
        Self {
            name: Some(config.name),
            attempt: Some(config.attempt),
            backoff: config.backoff,
            exponential_backoff: config.exponential_backoff,
            break_after_n_failure: config.break_after_n_failure,
            rate_limit_per_seconds: config.rate_limit_per_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn builder_requires_a_name() {
        let err = ExecutorConfigBuilder::new().attempt(3).build().unwrap_err();
        assert_eq!(err, ConfigError::MissingName);

        let err = ExecutorConfig::builder("   ").build().unwrap_err();
        assert_eq!(err, ConfigError::MissingName);
    }

    #[test]
    fn defaults_to_a_single_attempt() {
        let config = ExecutorConfig::builder("fetch").build().unwrap();
        assert_eq!(config.attempt(), 1);
        assert_eq!(config.backoff(), None);
        assert!(!config.exponential_backoff());
        assert_eq!(config.min_interval(), None);
    }

    #[test]
    fn zero_attempts_is_raised_to_one() {
        let config = ExecutorConfig::builder("fetch").attempt(0).build().unwrap();
        assert_eq!(config.attempt(), 1);
    }

    #[rstest]
    #[case(1, 1000)]
    #[case(4, 250)]
    #[case(3, 333)]
    #[case(1000, 1)]
    fn min_interval_is_whole_milliseconds(#[case] rate: u32, #[case] expected_ms: u64) {
        let config = ExecutorConfig::builder("fetch")
            .rate_limit_per_seconds(rate)
            .build()
            .unwrap();
        assert_eq!(config.min_interval(), Some(Duration::from_millis(expected_ms)));
    }

    #[rstest]
    #[case(ExecutorConfig::builder("x").rate_limit_per_seconds(0), "rate_limit_per_seconds")]
    #[case(ExecutorConfig::builder("x").break_after_n_failure(0), "break_after_n_failure")]
    fn rejects_out_of_range_values(
        #[case] builder: ExecutorConfigBuilder,
        #[case] field: &'static str,
    ) {
        match builder.build() {
            Err(ConfigError::InvalidValue { field: got, .. }) => assert_eq!(got, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }

    #[test]
    fn deserializes_through_validation() {
        let config: ExecutorConfig = serde_json::from_str(
            r#"{"name":"geo","attempt":3,"breakAfterNFailure":2,"rateLimitPerSeconds":10}"#,
        )
        .unwrap();
        assert_eq!(config.name(), "geo");
        assert_eq!(config.attempt(), 3);
        assert_eq!(config.break_after_n_failure(), Some(2));
        assert_eq!(config.rate_limit_per_seconds(), Some(10));

        let missing_name = serde_json::from_str::<ExecutorConfig>(r#"{"attempt":3}"#);
        assert!(missing_name.is_err());
    }

    #[cfg(feature = "humantime")]
    #[test]
    fn backoff_uses_human_readable_durations() {
        let config: ExecutorConfig =
            serde_json::from_str(r#"{"name":"geo","attempt":2,"backoff":"250ms"}"#).unwrap();
        assert_eq!(config.backoff(), Some(Duration::from_millis(250)));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["backoff"], "250ms");
    }

    #[test]
    fn serializes_back_to_the_same_config() {
        let config = ExecutorConfig::builder("geo")
            .attempt(2)
            .exponential_backoff(true)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: ExecutorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
