use argus_config::ConfidenceConfig;
use argus_core::entities::MergedFinding;
use argus_core::enums::Severity;
use tracing::debug;

/// Findings split by a [`ConfidenceFilter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<MergedFinding>,
    pub rejected: Vec<MergedFinding>,
}

/// Drops findings whose confidence is below the minimum for their severity.
///
/// With per-severity minimums enabled, critical findings survive at lower
/// confidence than informational ones.
#[derive(Debug, Clone)]
pub struct ConfidenceFilter {
    config: ConfidenceConfig,
}

impl ConfidenceFilter {
    #[must_use]
    pub const fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn minimum_for(&self, severity: Severity) -> f64 {
        self.config.minimum_for(severity)
    }

    /// NaN scores never pass.
    #[must_use]
    pub fn passes(&self, severity: Severity, overall: f64) -> bool {
        overall >= self.minimum_for(severity)
    }

    /// Judged on the resolved severity and the overall score.
    #[must_use]
    pub fn apply(&self, findings: Vec<MergedFinding>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        for merged in findings {
            if self.passes(merged.resolved_severity, merged.confidence.overall) {
                outcome.kept.push(merged);
            } else {
                debug!(
                    finding = %merged.finding.id,
                    severity = %merged.resolved_severity,
                    confidence = merged.confidence.overall,
                    minimum = self.minimum_for(merged.resolved_severity),
                    "finding dropped below confidence minimum"
                );
                outcome.rejected.push(merged);
            }
        }
        outcome
    }
}
