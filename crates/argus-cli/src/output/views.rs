//! Table layouts for the reports the library crates return.

use argus_confidence::{BatchReport, ScoredFinding};
use argus_core::entities::{MergedFinding, RawFinding};
use argus_merge::MergeOutcome;
use argus_worker::RunReport;
use schemars::Schema;
use serde_json::Value;

use super::score_cell;
use super::table::{Column, Tabular};

const MERGED_COLUMNS: &[Column] = &[
    Column::status("severity"),
    Column::number("confidence"),
    Column::status("level"),
    Column::text("source"),
    Column::text("location"),
    Column::text("category"),
    Column::wide("message"),
];

/// `path:start-end`, `path:line` or just the path.
pub fn location(finding: &RawFinding) -> String {
    match (finding.line_start, finding.line_end) {
        (Some(start), Some(end)) if end > start => format!("{}:{start}-{end}", finding.file_path),
        (Some(start), _) => format!("{}:{start}", finding.file_path),
        _ => finding.file_path.clone(),
    }
}

fn merged_rows(findings: &[MergedFinding]) -> Vec<Vec<String>> {
    findings
        .iter()
        .map(|merged| {
            vec![
                merged.resolved_severity.to_string(),
                score_cell(Some(merged.confidence.overall)),
                merged.confidence.level.to_string(),
                merged.source.to_string(),
                location(&merged.finding),
                merged.finding.category.to_string(),
                merged.finding.message.clone(),
            ]
        })
        .collect()
}

impl Tabular for RunReport {
    fn columns(&self) -> &'static [Column] {
        MERGED_COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        merged_rows(&self.findings)
    }

    fn caption(&self) -> Option<String> {
        Some(format!(
            "run {} {}: {} findings, {} conflicts, score {}",
            self.run.id,
            self.run.status,
            self.findings.len(),
            self.conflicts.len(),
            score_cell(self.run.aggregate_score),
        ))
    }

    fn empty_note(&self) -> &'static str {
        "(no findings)"
    }
}

impl Tabular for MergeOutcome {
    fn columns(&self) -> &'static [Column] {
        MERGED_COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        merged_rows(&self.findings)
    }

    fn caption(&self) -> Option<String> {
        Some(format!(
            "{} findings, {} conflicts, {} dropped, {} below the AI threshold",
            self.findings.len(),
            self.conflicts.len(),
            self.dropped.len(),
            self.below_ai_threshold,
        ))
    }

    fn empty_note(&self) -> &'static str {
        "(no findings)"
    }
}

impl Tabular for BatchReport {
    fn columns(&self) -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::number("score"),
            Column::status("level"),
            Column::status("severity"),
            Column::text("location"),
            Column::text("rule"),
            Column::wide("message"),
        ];
        COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.scored
            .iter()
            .map(|ScoredFinding { finding, score }| {
                vec![
                    score_cell(Some(score.overall)),
                    score.level.to_string(),
                    finding.severity.to_string(),
                    location(finding),
                    finding.rule_id.clone().unwrap_or_else(|| "-".to_string()),
                    finding.message.clone(),
                ]
            })
            .collect()
    }

    fn caption(&self) -> Option<String> {
        Some(format!(
            "{} findings, mean score {:.2}, {} below LOW",
            self.count,
            self.mean_score,
            self.below_low.len()
        ))
    }

    fn empty_note(&self) -> &'static str {
        "(no findings)"
    }
}

/// One row per top-level property of a JSON schema.
impl Tabular for Schema {
    fn columns(&self) -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::text("property"),
            Column::text("type"),
            Column::text("required"),
        ];
        COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let schema = self.as_value();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let Some(properties) = schema["properties"].as_object() else {
            return Vec::new();
        };

        properties
            .iter()
            .map(|(name, property)| {
                vec![
                    name.clone(),
                    type_name(property),
                    if required.contains(&name.as_str()) { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect()
    }

    fn caption(&self) -> Option<String> {
        self.as_value()["title"].as_str().map(str::to_string)
    }

    fn empty_note(&self) -> &'static str {
        "(no properties)"
    }
}

fn type_name(property: &Value) -> String {
    if let Some(name) = property["type"].as_str() {
        return name.to_string();
    }
    if let Some(names) = property["type"].as_array() {
        return names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("|");
    }
    if let Some(reference) = property["$ref"].as_str() {
        return reference.rsplit('/').next().unwrap_or(reference).to_string();
    }
    if property.get("anyOf").is_some() || property.get("oneOf").is_some() {
        return "union".to_string();
    }
    "-".to_string()
}
