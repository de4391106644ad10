//! Entity structs for all Argus domain objects.
//!
//! Runs, executions and tasks map to rows in the persisted store; findings and
//! summaries are stored as JSON against their run. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation.

mod confidence;
mod execution;
mod finding;
mod run;
mod summary;
mod task;

pub use confidence::{ConfidenceComponents, ConfidenceScore};
pub use execution::AgentExecution;
pub use finding::{MergeProvenance, MergedFinding, RawFinding};
pub use run::AnalysisRun;
pub use summary::RunSummary;
pub use task::AgentTask;

use crate::errors::CoreError;

fn invalid_transition(entity_type: &str, id: &str, from: &str, to: &str) -> CoreError {
    CoreError::InvalidTransition {
        entity_type: entity_type.to_string(),
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    }
}
