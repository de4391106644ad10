//! Result merger settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_duplicate_threshold() -> f64 {
    0.8
}

const fn default_ai_confidence_threshold() -> f64 {
    0.6
}

const fn default_prefer_static() -> bool {
    true
}

const fn default_line_window() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MergeConfig {
    /// Similarity at or above which two findings are duplicates.
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,

    /// AI findings below this confidence are dropped before merging.
    #[serde(default = "default_ai_confidence_threshold")]
    pub ai_confidence_threshold: f64,

    /// On severity conflicts keep the higher-priority source's value
    /// instead of the more severe one.
    #[serde(default = "default_prefer_static")]
    pub prefer_static_for_conflict: bool,

    /// Truncate the sorted output to this many findings.
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Line distance that still earns half line-proximity credit.
    #[serde(default = "default_line_window")]
    pub line_window: u32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: default_duplicate_threshold(),
            ai_confidence_threshold: default_ai_confidence_threshold(),
            prefer_static_for_conflict: default_prefer_static(),
            max_results: None,
            line_window: default_line_window(),
        }
    }
}

impl MergeConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a threshold is outside [0, 1]
    /// or `max_results` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("merge.duplicate_threshold", self.duplicate_threshold),
            ("merge.ai_confidence_threshold", self.ai_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{value} is outside [0, 1]"),
                ));
            }
        }
        if self.max_results == Some(0) {
            return Err(ConfigError::invalid(
                "merge.max_results",
                "must be positive when set",
            ));
        }
        Ok(())
    }
}
