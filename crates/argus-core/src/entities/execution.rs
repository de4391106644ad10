use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ExecutionStatus;
use crate::errors::CoreError;
use crate::ids::{PREFIX_EXECUTION, generate_id};

/// One agent's participation in an analysis run.
///
/// `position` preserves creation order; the worker runs executions in
/// ascending position.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AgentExecution {
    pub id: String,
    pub run_id: String,
    pub agent_name: String,
    pub position: u32,
    pub status: ExecutionStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
}

impl AgentExecution {
    /// Create a pending execution of `agent_name` within `run_id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if an ID cannot be generated.
    pub fn new(
        run_id: impl Into<String>,
        agent_name: impl Into<String>,
        position: u32,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id: generate_id(PREFIX_EXECUTION)?,
            run_id: run_id.into(),
            agent_name: agent_name.into(),
            position,
            status: ExecutionStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            duration_ms: None,
        })
    }

    /// Move to `next`. Entering a terminal state stamps `completed_at` and,
    /// if the execution had started, `duration_ms`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the state machine forbids the move.
    pub fn transition(
        &mut self,
        next: ExecutionStatus,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(super::invalid_transition(
                "execution",
                &self.id,
                self.status.as_str(),
                next.as_str(),
            ));
        }
        if next == ExecutionStatus::Running {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
            self.duration_ms = self.started_at.map(|started| {
                u64::try_from((now - started).num_milliseconds()).unwrap_or_default()
            });
        }
        self.status = next;
        Ok(())
    }
}
