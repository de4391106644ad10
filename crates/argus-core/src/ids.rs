//! ID prefix constants and generation.
//!
//! IDs look like `run-a3f8b2c1`: a short entity prefix, a dash, and 8 hex chars.

use crate::errors::CoreError;

pub const PREFIX_RUN: &str = "run";
pub const PREFIX_EXECUTION: &str = "exe";
pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_FINDING: &str = "fnd";

/// Generate a prefixed random ID, e.g. `"tsk-0c9e41aa"`.
///
/// # Errors
///
/// Returns `CoreError::Other` if the OS random source is unavailable.
pub fn generate_id(prefix: &str) -> Result<String, CoreError> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes)
        .map_err(|e| CoreError::Other(anyhow::anyhow!("failed to generate id: {e}")))?;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("{prefix}-{hex}"))
}
