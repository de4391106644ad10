//! End-to-end merge behaviour across static, rule and AI sources.

use argus_config::{ConfidenceConfig, MergeConfig};
use argus_core::entities::RawFinding;
use argus_core::enums::{FindingCategory, Severity, SourceKind};
use argus_merge::{
    ConflictField, ConflictInfo, ConflictResolver, ConflictValue, FindingSource, ResolutionRule,
    ResultMerger, generate_summary, similarity,
};
use pretty_assertions::assert_eq;

fn secret_finding(line: u32) -> RawFinding {
    RawFinding::new(
        FindingCategory::Security,
        Severity::High,
        "auth.ts",
        "JWT secret is hardcoded",
    )
    .with_rule("SEC001")
    .with_line(line)
}

fn distinct_findings() -> Vec<RawFinding> {
    vec![
        secret_finding(10),
        RawFinding::new(FindingCategory::Quality, Severity::Medium, "api.ts", "Function exceeds 80 lines")
            .with_line(40),
        RawFinding::new(FindingCategory::Style, Severity::Info, "ui/button.tsx", "Prefer const over let")
            .with_rule("STY002")
            .with_line(3),
        RawFinding::new(FindingCategory::Dependency, Severity::Low, "package.json", "lodash is outdated"),
    ]
}

#[test]
fn nearby_findings_with_same_rule_merge_into_one() {
    let first = secret_finding(10);
    let second = secret_finding(11);
    assert!(similarity(&first, &second, 3) >= 0.8);

    let outcome = ResultMerger::default().merge(
        vec![
            FindingSource::new(SourceKind::Static, vec![first]),
            FindingSource::new(SourceKind::Rule, vec![second]),
        ],
        None,
    );

    assert_eq!(outcome.findings.len(), 1);
    let merged = &outcome.findings[0];
    assert_eq!(merged.source, SourceKind::Static);
    assert_eq!(merged.finding.line_start, Some(10));
    assert_eq!(merged.merged_from.len(), 1);
    assert_eq!(merged.merged_from[0].source, SourceKind::Rule);
    assert!(merged.merged_from[0].similarity >= 0.8);
}

#[test]
fn ai_finding_below_threshold_is_excluded() {
    let ai = RawFinding::new(
        FindingCategory::Security,
        Severity::High,
        "session.ts",
        "Session token may leak through logs",
    )
    .with_ai_explanation("The token is interpolated into a debug log line.")
    .with_ai_confidence(0.4);

    let outcome = ResultMerger::default().merge(
        vec![FindingSource::new(SourceKind::Ai, vec![ai])],
        None,
    );

    assert!(outcome.findings.is_empty());
    assert_eq!(outcome.below_ai_threshold, 1);
    assert_eq!(outcome.summary.total, 0);
}

#[test]
fn ai_duplicate_only_enhances_existing_finding() {
    let static_finding = secret_finding(10);
    let mut ai = RawFinding::new(
        FindingCategory::Security,
        Severity::Critical,
        "auth.ts",
        "JWT secret is hardcoded",
    )
    .with_line(10)
    .with_ai_explanation("Anyone with repo access can forge tokens.")
    .with_ai_confidence(0.9);
    ai.ai_suggestion = Some("Load the secret from a vault".into());

    let outcome = ResultMerger::default().merge(
        vec![
            FindingSource::new(SourceKind::Ai, vec![ai]),
            FindingSource::new(SourceKind::Static, vec![static_finding]),
        ],
        None,
    );

    assert_eq!(outcome.findings.len(), 1);
    let merged = &outcome.findings[0];
    assert_eq!(merged.source, SourceKind::Static);
    assert_eq!(merged.finding.rule_id.as_deref(), Some("SEC001"));
    assert_eq!(
        merged.finding.ai_explanation.as_deref(),
        Some("Anyone with repo access can forge tokens.")
    );
    assert_eq!(
        merged.finding.ai_suggestion.as_deref(),
        Some("Load the secret from a vault")
    );
    // Static severity wins by default, and the disagreement is recorded.
    assert_eq!(merged.resolved_severity, Severity::High);
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].field, ConflictField::Severity);
    assert_eq!(
        outcome.conflicts[0].rule,
        Some(ResolutionRule::PreferHigherPriority)
    );
}

#[test]
fn most_severe_wins_when_static_preference_disabled() {
    let mut critical = secret_finding(10);
    critical.severity = Severity::Critical;
    let mut low = secret_finding(10);
    low.severity = Severity::Low;

    let merger = ResultMerger::new(
        MergeConfig {
            prefer_static_for_conflict: false,
            ..MergeConfig::default()
        },
        ConfidenceConfig::default(),
    );
    let outcome = merger.merge(
        vec![
            FindingSource::new(SourceKind::Static, vec![low]),
            FindingSource::new(SourceKind::Rule, vec![critical]),
        ],
        None,
    );

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].resolved_severity, Severity::Critical);
    let conflict = &outcome.conflicts[0];
    assert_eq!(conflict.rule, Some(ResolutionRule::MostSevere));
    assert_eq!(
        conflict.values,
        vec![
            ConflictValue::Severity(Severity::Low),
            ConflictValue::Severity(Severity::Critical),
        ]
    );
    assert_eq!(
        conflict.resolved,
        Some(ConflictValue::Severity(Severity::Critical))
    );
}

#[test]
fn differing_messages_are_auto_resolved_to_first() {
    let from_static = secret_finding(10);
    let mut from_rule = secret_finding(10);
    from_rule.message = "JWT secret is hardcoded in source".into();

    let outcome = ResultMerger::default().merge(
        vec![
            FindingSource::new(SourceKind::Rule, vec![from_rule]),
            FindingSource::new(SourceKind::Static, vec![from_static]),
        ],
        None,
    );

    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].finding.message, "JWT secret is hardcoded");
    let conflict = outcome
        .conflicts
        .iter()
        .find(|c| c.field == ConflictField::Message)
        .expect("message conflict recorded");
    assert_eq!(conflict.rule, Some(ResolutionRule::AutoKeepFirst));
    assert_eq!(
        conflict.resolved,
        Some(ConflictValue::Text("JWT secret is hardcoded".into()))
    );
}

#[test]
fn resolve_auto_prefers_critical_over_low() {
    for values in [
        vec![Severity::Critical, Severity::Low],
        vec![Severity::Low, Severity::Critical],
    ] {
        let mut conflicts = vec![ConflictInfo::unresolved(
            "fnd-00000001",
            ConflictField::Severity,
            values.into_iter().map(ConflictValue::Severity).collect(),
        )];
        ConflictResolver::resolve_auto(&mut conflicts);
        assert_eq!(
            conflicts[0].resolved,
            Some(ConflictValue::Severity(Severity::Critical))
        );
    }
}

#[test]
fn remerging_the_same_list_adds_no_duplicates() {
    let merger = ResultMerger::default();
    let findings = distinct_findings();

    let once = merger.merge(
        vec![FindingSource::new(SourceKind::Static, findings.clone())],
        None,
    );
    let twice = merger.merge(
        vec![
            FindingSource::new(SourceKind::Static, findings.clone()),
            FindingSource::new(SourceKind::Static, findings),
        ],
        None,
    );
    assert_eq!(once.findings.len(), 4);
    assert_eq!(twice.findings.len(), once.findings.len());

    let rerun: Vec<RawFinding> = once.findings.iter().map(|m| m.finding.clone()).collect();
    let again = merger.merge(
        vec![FindingSource::new(SourceKind::Static, rerun)],
        None,
    );
    assert_eq!(again.findings.len(), once.findings.len());

    for (i, a) in twice.findings.iter().enumerate() {
        for b in &twice.findings[i + 1..] {
            assert!(similarity(&a.finding, &b.finding, 3) < 0.8);
        }
    }
}

#[test]
fn malformed_findings_are_dropped_and_merge_continues() {
    let mut no_path = secret_finding(10).with_id("fnd-bad00001");
    no_path.file_path = String::new();
    let inverted = secret_finding(20).with_id("fnd-bad00002").with_lines(20, 5);

    let outcome = ResultMerger::default().merge(
        vec![FindingSource::new(
            SourceKind::Static,
            vec![no_path, inverted, secret_finding(40)],
        )],
        None,
    );

    assert_eq!(outcome.findings.len(), 1);
    let dropped: Vec<&str> = outcome.dropped.iter().map(|d| d.finding_id.as_str()).collect();
    assert_eq!(dropped, vec!["fnd-bad00001", "fnd-bad00002"]);
    assert!(outcome.findings[0].finding.id.starts_with("fnd-"));
}

#[test]
fn max_results_truncates_lowest_ranked() {
    let merger = ResultMerger::new(
        MergeConfig {
            max_results: Some(2),
            ..MergeConfig::default()
        },
        ConfidenceConfig::default(),
    );
    let outcome = merger.merge(
        vec![FindingSource::new(SourceKind::Static, distinct_findings())],
        None,
    );

    assert_eq!(outcome.findings.len(), 2);
    assert_eq!(outcome.truncated, 2);
    assert_eq!(outcome.findings[0].resolved_severity, Severity::High);
    assert_eq!(outcome.findings[1].resolved_severity, Severity::Medium);
}

#[test]
fn enabled_filter_drops_weak_informational_findings() {
    let merger = ResultMerger::new(
        MergeConfig::default(),
        ConfidenceConfig {
            filter_enabled: true,
            ..ConfidenceConfig::default()
        },
    );
    let info = RawFinding::new(FindingCategory::Style, Severity::Info, "a.ts", "Trailing whitespace")
        .with_line(2);
    let critical = RawFinding::new(
        FindingCategory::Security,
        Severity::Critical,
        "b.ts",
        "eval on user input",
    )
    .with_line(2);

    let outcome = merger.merge(
        vec![FindingSource::new(SourceKind::Static, vec![info, critical])],
        None,
    );

    assert_eq!(outcome.filtered_out, 1);
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].resolved_severity, Severity::Critical);
}

#[test]
fn summary_counts_final_list() {
    let outcome = ResultMerger::default().merge(
        vec![
            FindingSource::new(SourceKind::Static, distinct_findings()),
            FindingSource::new(SourceKind::Rule, vec![secret_finding(11)]),
        ],
        None,
    );
    let summary = generate_summary(&outcome.findings);

    assert_eq!(summary, outcome.summary);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.action_required, 1);
    assert_eq!(summary.critical_count, 0);
    assert_eq!(summary.by_source.get(&SourceKind::Static), Some(&4));
    assert_eq!(summary.by_severity.get(&Severity::Info), Some(&1));
    let mean = outcome
        .findings
        .iter()
        .map(|m| m.confidence.overall)
        .sum::<f64>()
        / 4.0;
    assert!((summary.mean_confidence - mean).abs() < 1e-9);
}
