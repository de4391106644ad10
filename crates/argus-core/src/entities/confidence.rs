use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ConfidenceLevel;

/// The five inputs blended into an overall confidence value.
///
/// `ai_penalty` and `change_penalty` are penalty magnitudes: higher means
/// more distrust.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
pub struct ConfidenceComponents {
    pub rule_based: f64,
    pub ast_evidence: f64,
    pub reproducibility: f64,
    pub ai_penalty: f64,
    pub change_penalty: f64,
}

/// Calibrated trust score for one finding. Derived, never stored on its own.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ConfidenceScore {
    /// Blended value, always within [0, 1].
    pub overall: f64,
    pub level: ConfidenceLevel,
    pub components: ConfidenceComponents,
    #[serde(default)]
    pub rationale: Vec<String>,
}
