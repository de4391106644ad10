use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RunStatus;
use crate::errors::CoreError;
use crate::ids::{PREFIX_RUN, generate_id};

/// One top-level analysis invocation against a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AnalysisRun {
    pub id: String,
    pub project_id: String,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Mean confidence of the final merged findings.
    pub aggregate_score: Option<f64>,
}

impl AnalysisRun {
    /// Create a pending run for `project_id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if an ID cannot be generated.
    pub fn new(project_id: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Self {
            id: generate_id(PREFIX_RUN)?,
            project_id: project_id.into(),
            status: RunStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            aggregate_score: None,
        })
    }

    /// Move to `next`, stamping `started_at` on entering `Running` and
    /// `completed_at` on entering a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the state machine forbids the move.
    pub fn transition(&mut self, next: RunStatus, now: DateTime<Utc>) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(super::invalid_transition(
                "run",
                &self.id,
                self.status.as_str(),
                next.as_str(),
            ));
        }
        if next == RunStatus::Running {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        self.status = next;
        Ok(())
    }
}
