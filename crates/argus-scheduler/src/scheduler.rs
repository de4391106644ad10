use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use argus_config::SchedulerConfig;
use argus_core::entities::AgentTask;
use argus_core::enums::ExecutionStatus;
use argus_core::errors::TaskError;
use argus_core::store::StatusSink;
use chrono::Utc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{SchedulerError, TaskHandle, TaskOutcome, TaskReport};

struct Shared {
    config: SchedulerConfig,
    slots: Arc<Semaphore>,
    sink: Arc<dyn StatusSink>,
    running: AtomicUsize,
}

/// Decrements the running count when an attempt ends, however it ends.
struct RunningGuard<'a>(&'a AtomicUsize);

impl<'a> RunningGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

enum Attempt<T> {
    Finished(Result<T, TaskError>),
    Cancelled,
}

/// Runs agent tasks on at most `max_concurrency` slots with retry and timeout.
///
/// The scheduler knows nothing about what a task does: callers hand it the
/// task row and a function producing the work for one attempt. Every status
/// transition is written to the [`StatusSink`] as it happens.
///
/// Slots are handed out first come, first served. The timeout and
/// cancellation are cooperative: the attempt's work is aborted, which stops
/// it at its next await point, and anything it produces afterwards is
/// discarded.
#[derive(Clone)]
pub struct TaskScheduler {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("config", &self.shared.config)
            .field("running", &self.running())
            .finish_non_exhaustive()
    }
}

impl TaskScheduler {
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if any limit is zero.
    pub fn new(config: SchedulerConfig, sink: Arc<dyn StatusSink>) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                slots: Arc::new(Semaphore::new(config.max_concurrency)),
                sink,
                running: AtomicUsize::new(0),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Tasks currently in `Running`.
    #[must_use]
    pub fn running(&self) -> usize {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Queue `task` for execution.
    ///
    /// `run_fn` is called once per attempt. The task is cancelled when
    /// `parent` is cancelled or through the returned handle.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Capacity` if `parent` is already cancelled,
    /// or `SchedulerError::NotPending` if the task is not pending.
    pub fn submit<T, F, Fut>(
        &self,
        task: AgentTask,
        run_fn: F,
        parent: &CancellationToken,
    ) -> Result<TaskHandle<T>, SchedulerError>
    where
        T: Send + 'static,
        F: Fn(AgentTask) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        if parent.is_cancelled() {
            return Err(SchedulerError::Capacity { task_id: task.id });
        }
        if task.status != ExecutionStatus::Pending {
            return Err(SchedulerError::NotPending {
                status: task.status.to_string(),
                task_id: task.id,
            });
        }

        let task_id = task.id.clone();
        let cancel = parent.child_token();
        let join = tokio::spawn(drive(
            Arc::clone(&self.shared),
            task,
            run_fn,
            cancel.clone(),
        ));
        debug!(task = %task_id, "task submitted");
        Ok(TaskHandle {
            task_id,
            cancel,
            join,
        })
    }
}

async fn drive<T, F, Fut>(
    shared: Arc<Shared>,
    mut task: AgentTask,
    run_fn: F,
    cancel: CancellationToken,
) -> Result<TaskReport<T>, SchedulerError>
where
    T: Send + 'static,
    F: Fn(AgentTask) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    let config = shared.config;

    loop {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return cancelled(&shared, task).await,
            permit = Arc::clone(&shared.slots).acquire_owned() => {
                permit.map_err(|_| SchedulerError::Closed)?
            }
        };

        task.start_attempt(Utc::now())?;
        shared.sink.record_task(&task).await?;
        let guard = RunningGuard::enter(&shared.running);
        debug!(task = %task.id, attempt = task.attempt_count, "task running");

        let mut work = tokio::spawn(run_fn(task.clone()));
        let attempt = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                work.abort();
                Attempt::Cancelled
            }
            joined = tokio::time::timeout(config.task_timeout(), &mut work) => match joined {
                Ok(Ok(result)) => Attempt::Finished(result),
                Ok(Err(join_error)) => Attempt::Finished(Err(TaskError::Permanent(format!(
                    "task work panicked: {join_error}"
                )))),
                Err(_elapsed) => {
                    work.abort();
                    Attempt::Finished(Err(TaskError::Timeout {
                        after_ms: config.task_timeout_ms,
                    }))
                }
            },
        };

        let error = match attempt {
            Attempt::Cancelled => {
                // The slot stays held until the CANCELLED row is written.
                let report = cancelled(&shared, task).await;
                drop(guard);
                drop(permit);
                return report;
            }
            Attempt::Finished(Ok(value)) => {
                task.finish(ExecutionStatus::Completed, None, Utc::now())?;
                shared.sink.record_task(&task).await?;
                debug!(task = %task.id, attempts = task.attempt_count, "task completed");
                return Ok(TaskReport {
                    task,
                    outcome: TaskOutcome::Completed(value),
                });
            }
            Attempt::Finished(Err(error)) => error,
        };

        if !error.is_retryable() || task.retries_used() >= config.max_retries {
            task.finish(ExecutionStatus::Failed, Some(error.to_string()), Utc::now())?;
            shared.sink.record_task(&task).await?;
            warn!(task = %task.id, attempts = task.attempt_count, %error, "task failed");
            return Ok(TaskReport {
                task,
                outcome: TaskOutcome::Failed(error),
            });
        }

        let delay = config.backoff_delay(task.retries_used());
        task.requeue(error.to_string())?;
        shared.sink.record_task(&task).await?;
        drop(guard);
        drop(permit);
        warn!(
            task = %task.id,
            attempt = task.attempt_count,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            %error,
            "task attempt failed, retrying"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return cancelled(&shared, task).await,
            () = tokio::time::sleep(delay) => {}
        }
    }
}

async fn cancelled<T>(shared: &Shared, mut task: AgentTask) -> Result<TaskReport<T>, SchedulerError> {
    task.finish(ExecutionStatus::Cancelled, None, Utc::now())?;
    shared.sink.record_task(&task).await?;
    debug!(task = %task.id, "task cancelled");
    Ok(TaskReport {
        task,
        outcome: TaskOutcome::Cancelled,
    })
}
