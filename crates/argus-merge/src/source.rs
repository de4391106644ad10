use argus_core::entities::RawFinding;
use argus_core::enums::SourceKind;
use serde::{Deserialize, Serialize};

/// One input to the merger: findings from a single kind of source.
///
/// ```json
/// { "source": "static", "priority": 3, "findings": [] }
/// ```
///
/// Without an explicit `priority` the kind's conventional priority applies
/// (static 3, rule 2, ai 1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindingSource {
    #[serde(rename = "source")]
    pub kind: SourceKind,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub findings: Vec<RawFinding>,
}

impl FindingSource {
    #[must_use]
    pub const fn new(kind: SourceKind, findings: Vec<RawFinding>) -> Self {
        Self {
            kind,
            priority: None,
            findings,
        }
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn priority(&self) -> u8 {
        self.priority
            .unwrap_or_else(|| self.kind.default_priority())
    }
}
