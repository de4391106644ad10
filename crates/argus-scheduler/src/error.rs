//! Scheduler error types.

use argus_config::ConfigError;
use argus_core::errors::{CoreError, StoreError};

/// Errors from submitting or driving scheduled tasks.
///
/// Task failures are not errors here: they end up in
/// [`TaskOutcome::Failed`](crate::TaskOutcome::Failed).
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The submission was rejected because its run is already cancelled.
    #[error("scheduler rejected task {task_id}: run already cancelled")]
    Capacity { task_id: String },

    /// Only pending tasks can be submitted.
    #[error("task {task_id} is {status}, only pending tasks can be submitted")]
    NotPending { task_id: String, status: String },

    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Recording a task transition failed.
    #[error("status store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transition(#[from] CoreError),

    /// The concurrency semaphore was closed.
    #[error("scheduler is closed")]
    Closed,

    /// The task runner itself panicked or was aborted.
    #[error("task runner failed: {0}")]
    Join(String),
}
