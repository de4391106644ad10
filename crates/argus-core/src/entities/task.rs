use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ExecutionStatus;
use crate::errors::CoreError;
use crate::ids::{PREFIX_TASK, generate_id};

/// Atomic unit of work assigned to an agent, e.g. "analyze `src/auth/`".
///
/// `started_at` records the first time the task entered `Running`;
/// `attempt_count` is the number of attempts started so far.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AgentTask {
    pub id: String,
    pub execution_id: String,
    pub target: String,
    pub status: ExecutionStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub attempt_count: u32,
}

impl AgentTask {
    /// Create a pending task for `execution_id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if an ID cannot be generated.
    pub fn new(execution_id: impl Into<String>, target: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Self {
            id: generate_id(PREFIX_TASK)?,
            execution_id: execution_id.into(),
            target: target.into(),
            status: ExecutionStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
            attempt_count: 0,
        })
    }

    fn transition(&mut self, next: ExecutionStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(super::invalid_transition(
                "task",
                &self.id,
                self.status.as_str(),
                next.as_str(),
            ));
        }
        self.status = next;
        Ok(())
    }

    /// `Pending → Running` for a new attempt.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless the task is pending.
    pub fn start_attempt(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(ExecutionStatus::Running)?;
        self.attempt_count += 1;
        self.started_at.get_or_insert(now);
        Ok(())
    }

    /// `Running → Pending` after a retryable failure. The error is kept so the
    /// last failure stays visible while the task waits for its next attempt.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless the task is running.
    pub fn requeue(&mut self, error: impl Into<String>) -> Result<(), CoreError> {
        self.transition(ExecutionStatus::Pending)?;
        self.error_message = Some(error.into());
        Ok(())
    }

    /// Enter a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `status` is not terminal, or
    /// `CoreError::InvalidTransition` if the current state forbids it.
    pub fn finish(
        &mut self,
        status: ExecutionStatus,
        error: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if !status.is_terminal() {
            return Err(CoreError::Validation(format!(
                "task {} cannot finish in non-terminal state {status}",
                self.id
            )));
        }
        self.transition(status)?;
        if error.is_some() {
            self.error_message = error;
        }
        self.completed_at = Some(now);
        Ok(())
    }

    /// Number of retries consumed so far (attempts beyond the first).
    #[must_use]
    pub const fn retries_used(&self) -> u32 {
        self.attempt_count.saturating_sub(1)
    }
}
