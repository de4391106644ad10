//! Reads a run's trail back.

use std::collections::BTreeMap;
use std::path::Path;

use argus_core::enums::EntityType;
use argus_core::trail::TrailOperation;

use crate::error::DatabaseError;

/// All operations of one run, in the order they were written.
///
/// A missing file means nothing was recorded and yields an empty list.
///
/// # Errors
///
/// Returns `DatabaseError::Trail` if the file cannot be read or a line is
/// not a trail operation.
pub fn read_run_trail(trail_dir: &Path, run_id: &str) -> Result<Vec<TrailOperation>, DatabaseError> {
    let path = trail_dir.join(format!("{run_id}.jsonl"));
    if !path.exists() {
        return Ok(Vec::new());
    }
    let ops = serde_jsonlines::json_lines::<TrailOperation, _>(&path)?
        .collect::<std::io::Result<Vec<_>>>()?;
    Ok(ops)
}

/// Latest recorded status per entity, keyed by `(entity type, id)`.
///
/// Operations without a string `status` in their data are skipped.
#[must_use]
pub fn latest_statuses(ops: &[TrailOperation]) -> BTreeMap<(String, String), String> {
    let mut latest = BTreeMap::new();
    for op in ops {
        if op.entity == EntityType::Finding {
            continue;
        }
        if let Some(status) = op.data.get("status").and_then(serde_json::Value::as_str) {
            latest.insert(
                (op.entity.as_str().to_string(), op.id.clone()),
                status.to_string(),
            );
        }
    }
    latest
}
