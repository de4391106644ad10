use argus_config::ConfidenceConfig;
use argus_core::entities::{ConfidenceComponents, ConfidenceScore, RawFinding};
use argus_core::enums::ConfidenceLevel;

use crate::batch::{BatchReport, ScoredFinding};

const WEIGHT_RULE: f64 = 0.50;
const WEIGHT_AST: f64 = 0.20;
const WEIGHT_REPRO: f64 = 0.20;
const WEIGHT_AI_PENALTY: f64 = 0.10;
const WEIGHT_CHANGE_PENALTY: f64 = 0.10;

const RULE_MATCHED: f64 = 1.0;
const RULE_DETERMINISTIC: f64 = 0.8;
const RULE_AI_ONLY: f64 = 0.3;

const REPRO_EXACT: f64 = 1.0;
const REPRO_DRIFTED: f64 = 0.8;
const REPRO_NEW: f64 = 0.5;
const REPRO_NO_HISTORY: f64 = 0.7;
const REPRO_LINE_WINDOW: u32 = 3;

const AI_PENALTY_UNRATED: f64 = 0.5;
const CHANGE_PENALTY: f64 = 0.5;

/// Clamp to [0, 1]. NaN maps to 0.
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn non_blank(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.trim().is_empty())
}

/// Scores findings with fixed component weights and configurable levels.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceCalculator {
    config: ConfidenceConfig,
}

impl ConfidenceCalculator {
    #[must_use]
    pub const fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Score one finding.
    ///
    /// `history` is the previous run's findings for the same project; `None`
    /// means no previous run exists, which scores reproducibility as neutral.
    #[must_use]
    pub fn calculate(&self, finding: &RawFinding, history: Option<&[RawFinding]>) -> ConfidenceScore {
        let mut rationale = Vec::new();

        let rule_based = Self::rule_based(finding, &mut rationale);
        let ast_evidence = self.ast_evidence(finding, &mut rationale);
        let reproducibility = Self::reproducibility(finding, history, &mut rationale);
        let ai_penalty = Self::ai_penalty(finding, &mut rationale);
        let change_penalty = Self::change_penalty(finding, &mut rationale);

        let components = ConfidenceComponents {
            rule_based: clamp01(rule_based),
            ast_evidence: clamp01(ast_evidence),
            reproducibility: clamp01(reproducibility),
            ai_penalty: clamp01(ai_penalty),
            change_penalty: clamp01(change_penalty),
        };
        let overall = Self::blend(&components);

        ConfidenceScore {
            overall,
            level: self.get_level(overall),
            components,
            rationale,
        }
    }

    /// Weighted blend of already computed components, clamped to [0, 1].
    #[must_use]
    pub fn blend(components: &ConfidenceComponents) -> f64 {
        clamp01(
            components.rule_based * WEIGHT_RULE
                + components.ast_evidence * WEIGHT_AST
                + components.reproducibility * WEIGHT_REPRO
                - components.ai_penalty * WEIGHT_AI_PENALTY
                - components.change_penalty * WEIGHT_CHANGE_PENALTY,
        )
    }

    #[must_use]
    pub fn get_level(&self, score: f64) -> ConfidenceLevel {
        if score >= self.config.high_threshold {
            ConfidenceLevel::High
        } else if score >= self.config.medium_threshold {
            ConfidenceLevel::Medium
        } else if score >= self.config.low_threshold {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    /// Score every finding and summarize the batch.
    #[must_use]
    pub fn calculate_batch(
        &self,
        findings: &[RawFinding],
        history: Option<&[RawFinding]>,
    ) -> BatchReport {
        let scored: Vec<ScoredFinding> = findings
            .iter()
            .map(|finding| ScoredFinding {
                score: self.calculate(finding, history),
                finding: finding.clone(),
            })
            .collect();
        BatchReport::from_scored(scored, self.config.low_threshold)
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    fn rule_based(finding: &RawFinding, rationale: &mut Vec<String>) -> f64 {
        if non_blank(finding.rule_id.as_deref()) {
            rationale.push(format!(
                "matched deterministic rule {}",
                finding.rule_id.as_deref().unwrap_or_default()
            ));
            RULE_MATCHED
        } else if finding.deterministic == Some(true) {
            rationale.push("flagged deterministic without a rule id".to_string());
            RULE_DETERMINISTIC
        } else {
            rationale.push("no deterministic rule backs this finding".to_string());
            RULE_AI_ONLY
        }
    }

    /// Counts structural signals against `min_evidence`. A valid line range
    /// and a range spanning more than one line are separate signals, so a
    /// single-line finding earns at most one of the two.
    fn ast_evidence(&self, finding: &RawFinding, rationale: &mut Vec<String>) -> f64 {
        let valid_range = finding.line_start.is_some_and(|start| {
            start >= 1 && finding.line_end.is_none_or(|end| end >= start)
        });
        let multi_line = matches!(
            (finding.line_start, finding.line_end),
            (Some(start), Some(end)) if end > start
        );
        let signals = [
            valid_range,
            multi_line,
            non_blank(finding.suggestion.as_deref()),
            !finding.ast_node_ids.is_empty(),
        ];
        let count = signals.iter().filter(|present| **present).count();

        rationale.push(format!(
            "{count} structural evidence signal(s) of {} needed",
            self.config.min_evidence
        ));
        #[allow(clippy::cast_precision_loss)]
        let ratio = count as f64 / f64::from(self.config.min_evidence.max(1));
        ratio.min(1.0)
    }

    fn reproducibility(
        finding: &RawFinding,
        history: Option<&[RawFinding]>,
        rationale: &mut Vec<String>,
    ) -> f64 {
        let Some(history) = history else {
            rationale.push("no prior run to compare against".to_string());
            return REPRO_NO_HISTORY;
        };

        let best = history
            .iter()
            .filter(|prior| Self::same_location(finding, prior))
            .map(|prior| {
                if prior.severity == finding.severity && prior.message == finding.message {
                    REPRO_EXACT
                } else {
                    REPRO_DRIFTED
                }
            })
            .fold(None, |best: Option<f64>, value| Some(best.map_or(value, |b| b.max(value))));

        match best {
            Some(value) if value >= REPRO_EXACT => {
                rationale.push("reproduced unchanged from the prior run".to_string());
                value
            }
            Some(value) => {
                rationale.push("seen in the prior run with different details".to_string());
                value
            }
            None => {
                rationale.push("not present in the prior run".to_string());
                REPRO_NEW
            }
        }
    }

    fn same_location(finding: &RawFinding, prior: &RawFinding) -> bool {
        if prior.file_path != finding.file_path || prior.rule_id != finding.rule_id {
            return false;
        }
        match (finding.line_start, prior.line_start) {
            (Some(a), Some(b)) => a.abs_diff(b) <= REPRO_LINE_WINDOW,
            (None, None) => true,
            _ => false,
        }
    }

    fn ai_penalty(finding: &RawFinding, rationale: &mut Vec<String>) -> f64 {
        if !finding.has_ai_content() {
            return 0.0;
        }
        match finding.ai_confidence {
            Some(confidence) if confidence.is_finite() => {
                rationale.push(format!("AI-generated content at confidence {confidence:.2}"));
                1.0 - clamp01(confidence)
            }
            _ => {
                rationale.push("AI-generated content without a confidence value".to_string());
                AI_PENALTY_UNRATED
            }
        }
    }

    fn change_penalty(finding: &RawFinding, rationale: &mut Vec<String>) -> f64 {
        if finding.code_changed == Some(true) {
            rationale.push("code changed since the last analysis".to_string());
            CHANGE_PENALTY
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::enums::{FindingCategory, Severity};
    use rstest::rstest;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn finding() -> RawFinding {
        RawFinding::new(
            FindingCategory::Security,
            Severity::High,
            "src/auth.ts",
            "JWT secret is hardcoded",
        )
    }

    #[rstest]
    #[case(Some("SEC001"), None, RULE_MATCHED)]
    #[case(Some("SEC001"), Some(false), RULE_MATCHED)]
    #[case(None, Some(true), RULE_DETERMINISTIC)]
    #[case(Some("  "), Some(true), RULE_DETERMINISTIC)]
    #[case(None, None, RULE_AI_ONLY)]
    fn rule_based_component(
        #[case] rule: Option<&str>,
        #[case] deterministic: Option<bool>,
        #[case] expected: f64,
    ) {
        let mut f = finding();
        f.rule_id = rule.map(String::from);
        f.deterministic = deterministic;
        let score = ConfidenceCalculator::default().calculate(&f, None);
        assert!(close(score.components.rule_based, expected));
    }

    #[test]
    fn ast_evidence_counts_signals_and_caps() {
        let calc = ConfidenceCalculator::default();

        let bare = calc.calculate(&finding(), None);
        assert!(close(bare.components.ast_evidence, 0.0));

        let single_line = calc.calculate(&finding().with_line(4), None);
        assert!(close(single_line.components.ast_evidence, 1.0 / 3.0));

        let mut all = finding().with_lines(4, 9).with_suggestion("rotate the key");
        all.ast_node_ids = vec!["node-17".into()];
        let capped = calc.calculate(&all, None);
        assert!(close(capped.components.ast_evidence, 1.0));
    }

    #[test]
    fn inverted_range_is_not_valid_evidence() {
        let f = finding().with_lines(12, 4);
        let score = ConfidenceCalculator::default().calculate(&f, None);
        assert!(close(score.components.ast_evidence, 0.0));
    }

    #[test]
    fn reproducibility_levels() {
        let calc = ConfidenceCalculator::default();
        let current = finding().with_rule("SEC001").with_line(10);

        let exact = vec![finding().with_rule("SEC001").with_line(12)];
        assert!(close(
            calc.calculate(&current, Some(exact.as_slice())).components.reproducibility,
            REPRO_EXACT
        ));

        let mut drifted = finding().with_rule("SEC001").with_line(8);
        drifted.severity = Severity::Low;
        assert!(close(
            calc.calculate(&current, Some(&[drifted][..])).components.reproducibility,
            REPRO_DRIFTED
        ));

        let far = vec![finding().with_rule("SEC001").with_line(40)];
        assert!(close(
            calc.calculate(&current, Some(far.as_slice())).components.reproducibility,
            REPRO_NEW
        ));

        assert!(close(
            calc.calculate(&current, Some(&[][..])).components.reproducibility,
            REPRO_NEW
        ));
        assert!(close(
            calc.calculate(&current, None).components.reproducibility,
            REPRO_NO_HISTORY
        ));
    }

    #[rstest]
    #[case(None, None, 0.0)]
    #[case(Some("explained"), None, AI_PENALTY_UNRATED)]
    #[case(Some("explained"), Some(0.9), 0.1)]
    #[case(Some("explained"), Some(f64::NAN), AI_PENALTY_UNRATED)]
    #[case(Some("explained"), Some(-3.0), 1.0)]
    #[case(None, Some(0.2), 0.0)]
    fn ai_penalty_component(
        #[case] explanation: Option<&str>,
        #[case] ai_confidence: Option<f64>,
        #[case] expected: f64,
    ) {
        let mut f = finding();
        f.ai_explanation = explanation.map(String::from);
        f.ai_confidence = ai_confidence;
        let score = ConfidenceCalculator::default().calculate(&f, None);
        assert!(
            close(score.components.ai_penalty, expected),
            "got {}",
            score.components.ai_penalty
        );
    }

    #[test]
    fn change_penalty_only_when_changed() {
        let calc = ConfidenceCalculator::default();
        let changed = calc.calculate(&finding().with_code_changed(true), None);
        let unchanged = calc.calculate(&finding().with_code_changed(false), None);
        assert!(close(changed.components.change_penalty, CHANGE_PENALTY));
        assert!(close(unchanged.components.change_penalty, 0.0));
        assert!(changed.overall < unchanged.overall);
    }

    #[rstest]
    #[case(0.95, ConfidenceLevel::High)]
    #[case(0.8, ConfidenceLevel::High)]
    #[case(0.79, ConfidenceLevel::Medium)]
    #[case(0.6, ConfidenceLevel::Medium)]
    #[case(0.4, ConfidenceLevel::Low)]
    #[case(0.39, ConfidenceLevel::VeryLow)]
    #[case(f64::NAN, ConfidenceLevel::VeryLow)]
    fn levels_follow_thresholds(#[case] score: f64, #[case] expected: ConfidenceLevel) {
        assert_eq!(ConfidenceCalculator::default().get_level(score), expected);
    }

    #[test]
    fn blend_clamps_adversarial_components() {
        let high = ConfidenceComponents {
            rule_based: 10.0,
            ast_evidence: 10.0,
            reproducibility: 10.0,
            ai_penalty: -10.0,
            change_penalty: -10.0,
        };
        assert!(close(ConfidenceCalculator::blend(&high), 1.0));

        let low = ConfidenceComponents {
            ai_penalty: 50.0,
            change_penalty: 50.0,
            ..ConfidenceComponents::default()
        };
        assert!(close(ConfidenceCalculator::blend(&low), 0.0));

        let nan = ConfidenceComponents {
            rule_based: f64::NAN,
            ..ConfidenceComponents::default()
        };
        assert!(close(ConfidenceCalculator::blend(&nan), 0.0));
    }
}
