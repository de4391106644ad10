use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConfidenceScore;
use crate::enums::{FindingCategory, Severity, SourceKind};

/// An unreconciled issue reported by one agent task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RawFinding {
    /// Empty until the producing worker stamps an ID.
    #[serde(default)]
    pub id: String,
    /// Name of the agent that produced the finding.
    #[serde(default)]
    pub agent: Option<String>,
    pub category: FindingCategory,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub severity: Severity,
    pub file_path: String,
    #[serde(default)]
    pub line_start: Option<u32>,
    #[serde(default)]
    pub line_end: Option<u32>,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub ai_explanation: Option<String>,
    #[serde(default)]
    pub ai_suggestion: Option<String>,
    #[serde(default)]
    pub ai_advisory: Option<String>,
    /// Confidence reported by the AI source itself, in [0, 1].
    #[serde(default)]
    pub ai_confidence: Option<f64>,
    #[serde(default)]
    pub deterministic: Option<bool>,
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
    /// Whether the underlying code region changed since the last analysis.
    #[serde(default)]
    pub code_changed: Option<bool>,
    /// Opaque source-specific data, carried through untouched.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl RawFinding {
    #[must_use]
    pub fn new(
        category: FindingCategory,
        severity: Severity,
        file_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            agent: None,
            category,
            subcategory: None,
            severity,
            file_path: file_path.into(),
            line_start: None,
            line_end: None,
            message: message.into(),
            suggestion: None,
            ai_explanation: None,
            ai_suggestion: None,
            ai_advisory: None,
            ai_confidence: None,
            deterministic: None,
            rule_id: None,
            ast_node_ids: Vec::new(),
            code_changed: None,
            payload: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_lines(mut self, start: u32, end: u32) -> Self {
        self.line_start = Some(start);
        self.line_end = Some(end);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line_start = Some(line);
        self.line_end = None;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub const fn with_deterministic(mut self, deterministic: bool) -> Self {
        self.deterministic = Some(deterministic);
        self
    }

    #[must_use]
    pub fn with_ai_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.ai_explanation = Some(explanation.into());
        self
    }

    #[must_use]
    pub const fn with_ai_confidence(mut self, confidence: f64) -> Self {
        self.ai_confidence = Some(confidence);
        self
    }

    #[must_use]
    pub const fn with_code_changed(mut self, changed: bool) -> Self {
        self.code_changed = Some(changed);
        self
    }

    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Whether any AI-generated explanation, suggestion or advisory is attached.
    #[must_use]
    pub fn has_ai_content(&self) -> bool {
        [&self.ai_explanation, &self.ai_suggestion, &self.ai_advisory]
            .iter()
            .any(|field| field.as_deref().is_some_and(|text| !text.trim().is_empty()))
    }
}

/// Records one finding that was folded into a merged finding as a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MergeProvenance {
    pub finding_id: String,
    pub source: SourceKind,
    pub agent: Option<String>,
    pub similarity: f64,
}

/// A deduplicated, conflict-resolved finding in a run's final output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MergedFinding {
    #[serde(flatten)]
    pub finding: RawFinding,
    pub source: SourceKind,
    pub resolved_severity: Severity,
    pub confidence: ConfidenceScore,
    #[serde(default)]
    pub merged_from: Vec<MergeProvenance>,
}
