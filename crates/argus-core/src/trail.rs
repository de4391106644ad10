//! JSONL trail operation envelope.
//!
//! Every status transition of a run, execution or task is recorded as a
//! `TrailOperation` in a per-run `trail/{run_id}.jsonl` file so progress can
//! be followed without querying the database.
//!
//! The `v` field supports schema versioning: trail lines written without a
//! `v` field deserialize with `v == 1` via `#[serde(default)]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityType, TrailOp};

/// Default trail version for lines without an explicit `v`.
const fn default_trail_version() -> u32 {
    1
}

/// A single operation recorded in the JSONL trail.
///
/// The `data` field holds the full entity state after the operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrailOperation {
    /// Schema version. Defaults to 1 when absent.
    #[serde(default = "default_trail_version")]
    pub v: u32,

    /// ISO 8601 timestamp of the operation.
    pub ts: String,

    /// Run that produced this operation.
    pub run: String,

    /// What kind of mutation this represents.
    pub op: TrailOp,

    /// Which entity type was affected.
    pub entity: EntityType,

    /// ID of the affected entity.
    pub id: String,

    /// Operation payload. Schema depends on `op` and `entity`.
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_op_roundtrip() {
        let op = TrailOperation {
            v: 1,
            ts: "2026-02-08T12:00:00Z".to_string(),
            run: "run-a3f8b2c1".to_string(),
            op: TrailOp::Transition,
            entity: EntityType::Task,
            id: "tsk-deadbeef".to_string(),
            data: serde_json::json!({"status": "running"}),
        };

        let json = serde_json::to_string(&op).unwrap();
        let recovered: TrailOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, op);
    }

    #[test]
    fn trail_op_default_version() {
        let json = r#"{"ts":"2026-01-01T00:00:00Z","run":"run-00000000","op":"create","entity":"run","id":"run-00000000","data":{}}"#;
        let op: TrailOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.v, 1);
        assert_eq!(op.op, TrailOp::Create);
    }
}
