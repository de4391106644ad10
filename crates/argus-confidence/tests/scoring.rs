//! Scoring scenarios and the [0, 1] bound under randomized inputs.

use argus_config::ConfidenceConfig;
use argus_confidence::{ConfidenceCalculator, ConfidenceFilter};
use argus_core::entities::{ConfidenceScore, MergedFinding, RawFinding};
use argus_core::enums::{ConfidenceLevel, FindingCategory, Severity, SourceKind};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn first_seen_rule_finding_with_evidence_is_high() {
    let finding = RawFinding::new(
        FindingCategory::Security,
        Severity::Critical,
        "src/auth.ts",
        "JWT secret is hardcoded",
    )
    .with_rule("SEC001")
    .with_lines(10, 12)
    .with_suggestion("Read the secret from the environment");

    let score = ConfidenceCalculator::default().calculate(&finding, None);

    assert!((score.overall - 0.84).abs() < 1e-9, "got {}", score.overall);
    assert_eq!(score.level, ConfidenceLevel::High);
    assert!(score.components.ai_penalty.abs() < f64::EPSILON);
    assert!(!score.rationale.is_empty());
}

#[test]
fn single_line_rule_finding_with_suggestion_is_medium() {
    let finding = RawFinding::new(
        FindingCategory::Security,
        Severity::Critical,
        "src/auth.ts",
        "JWT secret is hardcoded",
    )
    .with_rule("SEC001")
    .with_line(10)
    .with_suggestion("Read the secret from the environment");

    let score = ConfidenceCalculator::default().calculate(&finding, None);

    // Two of three evidence signals: the range is valid but spans one line.
    let expected = 0.5 + 0.2 * (2.0 / 3.0) + 0.2 * 0.7;
    assert!((score.components.ast_evidence - 2.0 / 3.0).abs() < 1e-9);
    assert!((score.overall - expected).abs() < 1e-9, "got {}", score.overall);
    assert_eq!(score.level, ConfidenceLevel::Medium);
}

#[test]
fn pure_ai_finding_without_confidence_is_very_low() {
    let finding = RawFinding::new(
        FindingCategory::Quality,
        Severity::Medium,
        "src/api.ts",
        "Function is hard to follow",
    )
    .with_ai_explanation("Deeply nested conditionals.");

    let score = ConfidenceCalculator::default().calculate(&finding, None);
    assert_eq!(score.level, ConfidenceLevel::VeryLow);
}

#[test]
fn custom_thresholds_change_levels() {
    let calc = ConfidenceCalculator::new(ConfidenceConfig {
        high_threshold: 0.9,
        medium_threshold: 0.7,
        low_threshold: 0.5,
        ..ConfidenceConfig::default()
    });
    assert_eq!(calc.get_level(0.84), ConfidenceLevel::Medium);
    assert_eq!(calc.get_level(0.45), ConfidenceLevel::VeryLow);
}

fn random_text(rng: &mut StdRng) -> Option<String> {
    match rng.gen_range(0..3) {
        0 => None,
        1 => Some("   ".to_string()),
        _ => Some("some generated text".to_string()),
    }
}

fn random_finding(rng: &mut StdRng) -> RawFinding {
    let severity = Severity::ALL[rng.gen_range(0..Severity::ALL.len())];
    let mut finding = RawFinding::new(FindingCategory::Security, severity, "src/lib.rs", "m");
    if rng.gen_bool(0.5) {
        finding.line_start = Some(rng.gen_range(0..500));
    }
    if rng.gen_bool(0.5) {
        finding.line_end = Some(rng.gen_range(0..500));
    }
    if rng.gen_bool(0.5) {
        finding.rule_id = Some(format!("R{}", rng.gen_range(0..4)));
    }
    finding.deterministic = [None, Some(true), Some(false)][rng.gen_range(0..3)];
    finding.suggestion = random_text(rng);
    finding.ai_explanation = random_text(rng);
    finding.ai_advisory = random_text(rng);
    finding.ai_confidence = match rng.gen_range(0..5) {
        0 => None,
        1 => Some(f64::NAN),
        2 => Some(f64::INFINITY),
        3 => Some(rng.gen_range(-100.0..100.0)),
        _ => Some(rng.gen_range(0.0..1.0)),
    };
    finding.code_changed = [None, Some(true), Some(false)][rng.gen_range(0..3)];
    finding.ast_node_ids = (0..rng.gen_range(0..3)).map(|i| format!("n{i}")).collect();
    finding
}

#[test]
fn overall_stays_in_unit_interval_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(0x00A2_6005);
    let calc = ConfidenceCalculator::default();
    let history: Vec<RawFinding> = (0..20).map(|_| random_finding(&mut rng)).collect();

    for _ in 0..2_000 {
        let finding = random_finding(&mut rng);
        let with_history = rng.gen_bool(0.5);
        let score = calc.calculate(&finding, with_history.then_some(history.as_slice()));

        assert!(
            (0.0..=1.0).contains(&score.overall),
            "overall {} out of range for {finding:?}",
            score.overall
        );
        let c = score.components;
        for value in [
            c.rule_based,
            c.ast_evidence,
            c.reproducibility,
            c.ai_penalty,
            c.change_penalty,
        ] {
            assert!((0.0..=1.0).contains(&value), "component {value} out of range");
        }
    }
}

fn merged(severity: Severity, overall: f64) -> MergedFinding {
    let calc = ConfidenceCalculator::default();
    MergedFinding {
        finding: RawFinding::new(FindingCategory::Security, severity, "a.rs", "m"),
        source: SourceKind::Ai,
        resolved_severity: severity,
        confidence: ConfidenceScore {
            overall,
            level: calc.get_level(overall),
            components: argus_core::entities::ConfidenceComponents::default(),
            rationale: Vec::new(),
        },
        merged_from: Vec::new(),
    }
}

#[test]
fn filter_keeps_low_confidence_critical_but_drops_info() {
    let filter = ConfidenceFilter::new(ConfidenceConfig::default());
    let outcome = filter.apply(vec![
        merged(Severity::Critical, 0.3),
        merged(Severity::Info, 0.3),
    ]);

    assert_eq!(outcome.kept.len(), 1);
    assert_eq!(outcome.kept[0].resolved_severity, Severity::Critical);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].resolved_severity, Severity::Info);
}
