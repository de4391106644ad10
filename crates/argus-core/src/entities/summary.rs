use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::MergedFinding;
use crate::enums::{FindingCategory, Severity, SourceKind};

/// Run-level rollup of the final merged findings.
///
/// Always recomputed from the merged list via [`RunSummary::from_findings`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_category: BTreeMap<FindingCategory, usize>,
    pub by_source: BTreeMap<SourceKind, usize>,
    pub mean_confidence: f64,
    pub critical_count: usize,
    /// Critical plus high findings.
    pub action_required: usize,
}

impl RunSummary {
    #[must_use]
    pub fn from_findings(findings: &[MergedFinding]) -> Self {
        let mut summary = Self {
            total: findings.len(),
            ..Self::default()
        };
        let mut confidence_sum = 0.0;

        for merged in findings {
            let severity = merged.resolved_severity;
            *summary.by_severity.entry(severity).or_default() += 1;
            *summary
                .by_category
                .entry(merged.finding.category)
                .or_default() += 1;
            *summary.by_source.entry(merged.source).or_default() += 1;
            confidence_sum += merged.confidence.overall;

            if severity == Severity::Critical {
                summary.critical_count += 1;
            }
            if severity.is_actionable() {
                summary.action_required += 1;
            }
        }

        if !findings.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let count = findings.len() as f64;
            summary.mean_confidence = confidence_sum / count;
        }
        summary
    }
}
