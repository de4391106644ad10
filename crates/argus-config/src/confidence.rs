//! Confidence level thresholds and filter minimums.

use argus_core::enums::Severity;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_high() -> f64 {
    0.8
}

const fn default_medium() -> f64 {
    0.6
}

const fn default_low() -> f64 {
    0.4
}

const fn default_min_evidence() -> u32 {
    3
}

const fn default_use_severity_minimums() -> bool {
    true
}

/// Minimum confidence a finding needs to survive filtering, per severity.
///
/// Critical findings tolerate less confidence than informational ones.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct SeverityMinimums {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub info: f64,
}

impl Default for SeverityMinimums {
    fn default() -> Self {
        Self {
            critical: 0.2,
            high: 0.3,
            medium: 0.4,
            low: 0.5,
            info: 0.6,
        }
    }
}

impl SeverityMinimums {
    #[must_use]
    pub const fn for_severity(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConfidenceConfig {
    #[serde(default = "default_high")]
    pub high_threshold: f64,

    #[serde(default = "default_medium")]
    pub medium_threshold: f64,

    #[serde(default = "default_low")]
    pub low_threshold: f64,

    /// Evidence signals needed for full AST evidence credit.
    #[serde(default = "default_min_evidence")]
    pub min_evidence: u32,

    /// Flat minimum applied when per-severity minimums are disabled.
    #[serde(default)]
    pub min_confidence: f64,

    #[serde(default = "default_use_severity_minimums")]
    pub use_severity_minimums: bool,

    #[serde(default)]
    pub severity_minimums: SeverityMinimums,

    /// Apply the confidence filter to merge output.
    #[serde(default)]
    pub filter_enabled: bool,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            high_threshold: default_high(),
            medium_threshold: default_medium(),
            low_threshold: default_low(),
            min_evidence: default_min_evidence(),
            min_confidence: 0.0,
            use_severity_minimums: default_use_severity_minimums(),
            severity_minimums: SeverityMinimums::default(),
            filter_enabled: false,
        }
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}

impl ConfidenceConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a threshold is outside [0, 1],
    /// the level thresholds are not strictly descending, or `min_evidence` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("confidence.high_threshold", self.high_threshold)?;
        check_unit("confidence.medium_threshold", self.medium_threshold)?;
        check_unit("confidence.low_threshold", self.low_threshold)?;
        check_unit("confidence.min_confidence", self.min_confidence)?;
        for severity in Severity::ALL {
            check_unit(
                &format!("confidence.severity_minimums.{severity}"),
                self.severity_minimums.for_severity(severity),
            )?;
        }

        if !(self.high_threshold > self.medium_threshold
            && self.medium_threshold > self.low_threshold)
        {
            return Err(ConfigError::invalid(
                "confidence.high_threshold",
                "level thresholds must satisfy high > medium > low",
            ));
        }
        if self.min_evidence == 0 {
            return Err(ConfigError::invalid(
                "confidence.min_evidence",
                "must be a positive integer",
            ));
        }
        Ok(())
    }

    /// Minimum confidence a finding of `severity` must reach to be kept.
    #[must_use]
    pub const fn minimum_for(&self, severity: Severity) -> f64 {
        if self.use_severity_minimums {
            self.severity_minimums.for_severity(severity)
        } else {
            self.min_confidence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConfidenceConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.filter_enabled);
        assert!((config.minimum_for(Severity::Critical) - 0.2).abs() < f64::EPSILON);
        assert!((config.minimum_for(Severity::Info) - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_minimum_when_severity_minimums_disabled() {
        let config = ConfidenceConfig {
            use_severity_minimums: false,
            min_confidence: 0.45,
            ..ConfidenceConfig::default()
        };
        assert!((config.minimum_for(Severity::Critical) - 0.45).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_order_thresholds() {
        let config = ConfidenceConfig {
            medium_threshold: 0.9,
            ..ConfidenceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_minimum() {
        let mut config = ConfidenceConfig::default();
        config.severity_minimums.low = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("severity_minimums.low"));
    }
}
