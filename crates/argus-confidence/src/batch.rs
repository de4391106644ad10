use std::collections::BTreeMap;

use argus_core::entities::{ConfidenceScore, RawFinding};
use argus_core::enums::ConfidenceLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredFinding {
    pub finding: RawFinding,
    pub score: ConfidenceScore,
}

/// Result of scoring a batch of findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    pub count: usize,
    /// Mean overall score; 0 for an empty batch.
    pub mean_score: f64,
    /// Count per level. Every level is present, possibly with zero.
    pub distribution: BTreeMap<ConfidenceLevel, usize>,
    /// Findings scoring below the LOW threshold.
    pub below_low: Vec<ScoredFinding>,
    pub scored: Vec<ScoredFinding>,
}

impl BatchReport {
    pub(crate) fn from_scored(scored: Vec<ScoredFinding>, low_threshold: f64) -> Self {
        let mut distribution: BTreeMap<ConfidenceLevel, usize> = [
            ConfidenceLevel::High,
            ConfidenceLevel::Medium,
            ConfidenceLevel::Low,
            ConfidenceLevel::VeryLow,
        ]
        .into_iter()
        .map(|level| (level, 0))
        .collect();

        let mut total = 0.0;
        for item in &scored {
            *distribution.entry(item.score.level).or_default() += 1;
            total += item.score.overall;
        }

        let mean_score = if scored.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let count = scored.len() as f64;
            total / count
        };

        let below_low = scored
            .iter()
            .filter(|item| item.score.overall < low_threshold)
            .cloned()
            .collect();

        Self {
            count: scored.len(),
            mean_score,
            distribution,
            below_low,
            scored,
        }
    }
}
