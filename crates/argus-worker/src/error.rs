use argus_core::errors::{CoreError, StoreError};
use argus_scheduler::SchedulerError;

/// Run-level failures of the analysis worker.
///
/// Agent task failures never show up here; they are recorded on the task and
/// execution rows and only downgrade the run to `Partial`.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Another worker call is already driving this run.
    #[error("run {run_id} is already being executed")]
    AlreadyRunning { run_id: String },

    /// The run is not bound to this worker.
    #[error("run {run_id} is not running on this worker")]
    NotRunning { run_id: String },

    /// Only pending runs can be executed.
    #[error("run {run_id} is {status}, only pending runs can be executed")]
    NotPending { run_id: String, status: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// A run plan or its recorded findings could not be read.
    #[error("invalid run plan: {0}")]
    Plan(String),
}
