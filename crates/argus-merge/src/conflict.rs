//! Conflicts between duplicate findings and their resolution.

use argus_core::entities::MergedFinding;
use argus_core::enums::{FindingCategory, Severity};
use serde::{Deserialize, Serialize};

/// Field on which two duplicate findings disagreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictField {
    Severity,
    Category,
    Message,
    Suggestion,
}

/// One of the competing values. Values are listed highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ConflictValue {
    Severity(Severity),
    Category(FindingCategory),
    Text(String),
}

/// How a conflict was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    /// Kept the value of the higher-priority source.
    PreferHigherPriority,
    /// Kept the more severe severity.
    MostSevere,
    /// Automatic post-hoc resolution to the highest severity.
    AutoHighestSeverity,
    /// Automatic post-hoc resolution to the first value.
    AutoKeepFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictInfo {
    /// Merged finding the conflict belongs to.
    pub finding_id: String,
    pub field: ConflictField,
    pub values: Vec<ConflictValue>,
    pub rule: Option<ResolutionRule>,
    pub resolved: Option<ConflictValue>,
}

impl ConflictInfo {
    #[must_use]
    pub fn unresolved(
        finding_id: impl Into<String>,
        field: ConflictField,
        values: Vec<ConflictValue>,
    ) -> Self {
        Self {
            finding_id: finding_id.into(),
            field,
            values,
            rule: None,
            resolved: None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Settles conflicts the merger could not settle inline.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Resolve every unresolved conflict in place.
    ///
    /// Severity conflicts go to the highest severity among the values; any
    /// other field keeps its first value. Returns how many were resolved.
    pub fn resolve_auto(conflicts: &mut [ConflictInfo]) -> usize {
        let mut resolved = 0;
        for conflict in conflicts.iter_mut().filter(|c| !c.is_resolved()) {
            let (rule, value) = Self::auto_value(conflict);
            if value.is_some() {
                conflict.rule = Some(rule);
                conflict.resolved = value;
                resolved += 1;
            }
        }
        resolved
    }

    fn auto_value(conflict: &ConflictInfo) -> (ResolutionRule, Option<ConflictValue>) {
        if conflict.field == ConflictField::Severity {
            let highest = conflict
                .values
                .iter()
                .filter_map(|value| match value {
                    ConflictValue::Severity(severity) => Some(*severity),
                    _ => None,
                })
                .max()
                .map(ConflictValue::Severity);
            (ResolutionRule::AutoHighestSeverity, highest)
        } else {
            (ResolutionRule::AutoKeepFirst, conflict.values.first().cloned())
        }
    }

    /// Write a resolved value back onto the merged finding it belongs to.
    pub fn apply(conflict: &ConflictInfo, merged: &mut MergedFinding) {
        let Some(value) = &conflict.resolved else {
            return;
        };
        match (conflict.field, value) {
            (ConflictField::Severity, ConflictValue::Severity(severity)) => {
                merged.resolved_severity = *severity;
            }
            (ConflictField::Category, ConflictValue::Category(category)) => {
                merged.finding.category = *category;
            }
            (ConflictField::Message, ConflictValue::Text(text)) => {
                merged.finding.message.clone_from(text);
            }
            (ConflictField::Suggestion, ConflictValue::Text(text)) => {
                merged.finding.suggestion = Some(text.clone());
            }
            _ => {}
        }
    }
}
