//! Task scheduler limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_max_concurrency() -> usize {
    4
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_base_delay_ms() -> u64 {
    500
}

const fn default_task_timeout_ms() -> u64 {
    120_000
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Upper bound on simultaneously running tasks across all agents.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Retries after the first attempt before a task fails terminally.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base; retry `n` waits `base * 2^n`.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Per-attempt time budget.
    #[serde(default = "default_task_timeout_ms")]
    pub task_timeout_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            task_timeout_ms: default_task_timeout_ms(),
        }
    }
}

impl SchedulerConfig {
    /// Build a validated scheduler configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is zero.
    pub fn new(
        max_concurrency: usize,
        max_retries: u32,
        retry_base_delay_ms: u64,
        task_timeout_ms: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            max_concurrency,
            max_retries,
            retry_base_delay_ms,
            task_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first zero field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero_fields = [
            ("scheduler.max_concurrency", self.max_concurrency == 0),
            ("scheduler.max_retries", self.max_retries == 0),
            ("scheduler.retry_base_delay_ms", self.retry_base_delay_ms == 0),
            ("scheduler.task_timeout_ms", self.task_timeout_ms == 0),
        ];
        match zero_fields.iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(ConfigError::invalid(field, "must be a positive integer")),
            None => Ok(()),
        }
    }

    #[must_use]
    pub const fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }

    /// Delay before retry number `retries_used + 1`: `base * 2^retries_used`.
    ///
    /// Saturates instead of overflowing for large retry counts.
    #[must_use]
    pub fn backoff_delay(&self, retries_used: u32) -> Duration {
        let factor = 1u64.checked_shl(retries_used).unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(factor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base_delay_ms, 500);
        assert_eq!(config.task_timeout(), Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn new_rejects_zero_values() {
        let err = SchedulerConfig::new(0, 3, 500, 1000).unwrap_err();
        assert!(err.to_string().contains("scheduler.max_concurrency"));

        let err = SchedulerConfig::new(2, 3, 500, 0).unwrap_err();
        assert!(err.to_string().contains("scheduler.task_timeout_ms"));
    }

    #[test]
    fn backoff_doubles_per_retry() {
        let config = SchedulerConfig::new(1, 3, 100, 1000).unwrap();
        assert_eq!(config.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(config.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(400));
    }

    #[test]
    fn backoff_saturates() {
        let config = SchedulerConfig::default();
        assert_eq!(
            config.backoff_delay(80),
            Duration::from_millis(u64::MAX)
        );
    }
}
