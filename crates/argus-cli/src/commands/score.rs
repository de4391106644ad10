use std::collections::BTreeMap;

use argus_confidence::{BatchReport, ConfidenceCalculator};
use argus_config::ArgusConfig;
use argus_core::entities::RawFinding;
use argus_core::enums::ConfidenceLevel;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ScoreArgs;
use crate::commands::shared::input::{read_history, read_json};
use crate::output::{Column, Tabular, output};

#[derive(Debug, Serialize)]
struct ScoreSummary {
    count: usize,
    mean_score: f64,
    distribution: BTreeMap<ConfidenceLevel, usize>,
    below_low: usize,
}

impl From<&BatchReport> for ScoreSummary {
    fn from(report: &BatchReport) -> Self {
        Self {
            count: report.count,
            mean_score: report.mean_score,
            distribution: report.distribution.clone(),
            below_low: report.below_low.len(),
        }
    }
}

impl Tabular for ScoreSummary {
    fn columns(&self) -> &'static [Column] {
        const COLUMNS: &[Column] = &[Column::status("level"), Column::number("findings")];
        COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.distribution
            .iter()
            .map(|(level, count)| vec![level.to_string(), count.to_string()])
            .collect()
    }

    fn caption(&self) -> Option<String> {
        Some(format!(
            "{} findings, mean score {:.2}, {} below LOW",
            self.count, self.mean_score, self.below_low
        ))
    }
}

/// Handle `argus score`.
pub fn handle(args: &ScoreArgs, config: &ArgusConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = score_file(args, config)?;
    if args.summary_only {
        return output(&ScoreSummary::from(&report), flags.format);
    }
    output(&report, flags.format)
}

fn score_file(args: &ScoreArgs, config: &ArgusConfig) -> anyhow::Result<BatchReport> {
    let findings: Vec<RawFinding> = read_json(&args.findings)?;
    let history = read_history(args.history.as_deref())?;
    let calculator = ConfidenceCalculator::new(config.confidence.clone());
    Ok(calculator.calculate_batch(&findings, history.as_deref()))
}
