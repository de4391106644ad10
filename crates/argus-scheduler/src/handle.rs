use argus_core::entities::AgentTask;
use argus_core::enums::ExecutionStatus;
use argus_core::errors::TaskError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::SchedulerError;

/// Terminal result of a scheduled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Completed(T),
    /// The last error once retries are exhausted or the error is permanent.
    Failed(TaskError),
    Cancelled,
}

impl<T> TaskOutcome<T> {
    #[must_use]
    pub const fn status(&self) -> ExecutionStatus {
        match self {
            Self::Completed(_) => ExecutionStatus::Completed,
            Self::Failed(_) => ExecutionStatus::Failed,
            Self::Cancelled => ExecutionStatus::Cancelled,
        }
    }
}

/// Final task row together with its outcome.
#[derive(Debug, Clone)]
pub struct TaskReport<T> {
    pub task: AgentTask,
    pub outcome: TaskOutcome<T>,
}

/// Handle to a submitted task.
///
/// Dropping the handle does not cancel the task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    pub(crate) task_id: String,
    pub(crate) cancel: CancellationToken,
    pub(crate) join: JoinHandle<Result<TaskReport<T>, SchedulerError>>,
}

impl<T> TaskHandle<T> {
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Request cancellation. A pending task is cancelled before it starts; a
    /// running task is cancelled at its next cancellation check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to reach a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Store` if a transition could not be recorded,
    /// or `SchedulerError::Join` if the runner panicked.
    pub async fn join(self) -> Result<TaskReport<T>, SchedulerError> {
        self.join
            .await
            .map_err(|e| SchedulerError::Join(e.to_string()))?
    }
}
