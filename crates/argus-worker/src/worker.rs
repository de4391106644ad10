use std::collections::{BTreeMap, HashMap};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use argus_config::ArgusConfig;
use argus_core::entities::{
    AgentExecution, AgentTask, AnalysisRun, MergedFinding, RawFinding, RunSummary,
};
use argus_core::enums::{ExecutionStatus, RunStatus, SourceKind};
use argus_core::errors::TaskError;
use argus_core::store::{RunStore, StatusSink};
use argus_merge::{ConflictInfo, DroppedFinding, FindingSource, ResultMerger};
use argus_scheduler::{SchedulerError, TaskOutcome, TaskScheduler};
use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::WorkerError;
use crate::agent::{Agent, AgentRegistry};

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run: AnalysisRun,
    pub executions: Vec<AgentExecution>,
    pub findings: Vec<MergedFinding>,
    pub summary: RunSummary,
    pub conflicts: Vec<ConflictInfo>,
    pub dropped: Vec<DroppedFinding>,
}

type ActiveRuns = Mutex<HashMap<String, CancellationToken>>;

fn lock(active: &ActiveRuns) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Unbinds a run from the worker when `execute_run` returns.
struct Binding<'a> {
    active: &'a ActiveRuns,
    run_id: String,
}

impl Drop for Binding<'_> {
    fn drop(&mut self) {
        lock(self.active).remove(&self.run_id);
    }
}

type AttemptFuture = Pin<Box<dyn Future<Output = Result<Vec<RawFinding>, TaskError>> + Send>>;

/// Findings of one execution, tagged with how they should be merged.
struct ExecutionYield {
    source: SourceKind,
    findings: Vec<RawFinding>,
}

/// Drives analysis runs: executions one after another, the tasks of each
/// execution concurrently through the shared [`TaskScheduler`].
///
/// A failing agent never aborts the run; the run just ends `Partial`. Store
/// failures do abort it: the run is marked `Failed` and the error returned.
pub struct AnalysisWorker {
    store: Arc<dyn RunStore>,
    scheduler: TaskScheduler,
    registry: AgentRegistry,
    merger: ResultMerger,
    active: ActiveRuns,
}

impl std::fmt::Debug for AnalysisWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisWorker")
            .field("scheduler", &self.scheduler)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl AnalysisWorker {
    /// # Errors
    ///
    /// Returns `WorkerError::Scheduler` if the scheduler limits are invalid.
    pub fn new<S>(store: Arc<S>, registry: AgentRegistry, config: &ArgusConfig) -> Result<Self, WorkerError>
    where
        S: RunStore + 'static,
    {
        let sink: Arc<dyn StatusSink> = store.clone();
        let scheduler = TaskScheduler::new(config.scheduler, sink)?;
        Ok(Self {
            store,
            scheduler,
            registry,
            merger: ResultMerger::new(config.merge.clone(), config.confidence.clone()),
            active: Mutex::new(HashMap::new()),
        })
    }

    #[must_use]
    pub const fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn is_running(&self, run_id: &str) -> bool {
        lock(&self.active).contains_key(run_id)
    }

    /// Request that a bound run stops.
    ///
    /// Pending tasks are cancelled, running ones at their next check, and
    /// executions not yet started are marked cancelled. Completed executions
    /// keep their results.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::NotRunning` if no call is executing `run_id`.
    pub fn cancel_run(&self, run_id: &str) -> Result<(), WorkerError> {
        let active = lock(&self.active);
        let token = active.get(run_id).ok_or_else(|| WorkerError::NotRunning {
            run_id: run_id.to_string(),
        })?;
        info!(run = %run_id, "cancelling run");
        token.cancel();
        Ok(())
    }

    /// Execute a pending run to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::AlreadyRunning` if the run is bound to another
    /// call, `WorkerError::NotPending` if it is not pending, and store or
    /// scheduler errors, in which case the run is marked `Failed`.
    pub async fn execute_run(&self, run_id: &str) -> Result<RunReport, WorkerError> {
        let (_binding, token) = self.bind(run_id)?;

        let mut run = self.store.get_run(run_id).await?;
        if run.status != RunStatus::Pending {
            return Err(WorkerError::NotPending {
                run_id: run.id,
                status: run.status.to_string(),
            });
        }

        match self.drive(&mut run, &token).await {
            Ok(report) => Ok(report),
            Err(error) => {
                token.cancel();
                self.fail_run(&mut run, &error).await;
                Err(error)
            }
        }
    }

    fn bind(&self, run_id: &str) -> Result<(Binding<'_>, CancellationToken), WorkerError> {
        let mut active = lock(&self.active);
        if active.contains_key(run_id) {
            return Err(WorkerError::AlreadyRunning {
                run_id: run_id.to_string(),
            });
        }
        let token = CancellationToken::new();
        active.insert(run_id.to_string(), token.clone());
        Ok((
            Binding {
                active: &self.active,
                run_id: run_id.to_string(),
            },
            token,
        ))
    }

    async fn fail_run(&self, run: &mut AnalysisRun, error: &WorkerError) {
        warn!(run = %run.id, %error, "run failed");
        if run.status.is_terminal() {
            return;
        }
        if let Err(e) = run.transition(RunStatus::Failed, Utc::now()) {
            warn!(run = %run.id, error = %e, "cannot mark run failed");
            return;
        }
        if let Err(e) = self.store.record_run(run).await {
            warn!(run = %run.id, error = %e, "cannot record failed run");
        }
    }

    async fn drive(
        &self,
        run: &mut AnalysisRun,
        token: &CancellationToken,
    ) -> Result<RunReport, WorkerError> {
        run.transition(RunStatus::Running, Utc::now())?;
        self.store.record_run(run).await?;

        let history = self.store.previous_findings(run).await?;
        let mut executions = self.store.list_executions(&run.id).await?;
        info!(run = %run.id, project = %run.project_id, agents = executions.len(), "run started");

        let mut produced: BTreeMap<SourceKind, Vec<RawFinding>> = BTreeMap::new();
        // Set only when this call cancels an execution; a cancel arriving
        // after the last execution finished does not relabel the run.
        let mut interrupted = false;
        for execution in &mut executions {
            if execution.status == ExecutionStatus::Cancelled {
                debug!(execution = %execution.id, "skipping cancelled execution");
                continue;
            }
            if token.is_cancelled() {
                execution.transition(ExecutionStatus::Cancelled, Utc::now())?;
                self.store.record_execution(execution).await?;
                interrupted = true;
                continue;
            }
            let outcome = self.run_execution(execution, token).await?;
            interrupted |= token.is_cancelled() && execution.status != ExecutionStatus::Completed;
            produced
                .entry(outcome.source)
                .or_default()
                .extend(outcome.findings);
        }

        let final_status = if interrupted {
            RunStatus::Cancelled
        } else if executions
            .iter()
            .all(|e| e.status == ExecutionStatus::Completed)
        {
            RunStatus::Completed
        } else {
            RunStatus::Partial
        };

        let sources = produced
            .into_iter()
            .map(|(kind, findings)| FindingSource::new(kind, findings))
            .collect();
        let merged = self.merger.merge(sources, history.as_deref());
        self.store
            .save_results(&run.id, &merged.findings, &merged.summary)
            .await?;

        run.aggregate_score = Some(merged.summary.mean_confidence);
        run.transition(final_status, Utc::now())?;
        self.store.record_run(run).await?;
        info!(
            run = %run.id,
            status = %run.status,
            findings = merged.findings.len(),
            conflicts = merged.conflicts.len(),
            "run finished"
        );

        Ok(RunReport {
            run: run.clone(),
            executions,
            findings: merged.findings,
            summary: merged.summary,
            conflicts: merged.conflicts,
            dropped: merged.dropped,
        })
    }

    /// Run every pending task of `execution` and wait for all of them.
    async fn run_execution(
        &self,
        execution: &mut AgentExecution,
        token: &CancellationToken,
    ) -> Result<ExecutionYield, WorkerError> {
        let tasks = self.store.list_tasks(&execution.id).await?;
        execution.transition(ExecutionStatus::Running, Utc::now())?;
        self.store.record_execution(execution).await?;

        let agent = self.registry.get(&execution.agent_name);
        let source = agent.as_ref().map_or(SourceKind::Ai, |a| a.source());
        if agent.is_none() {
            warn!(agent = %execution.agent_name, "no such agent registered");
        }
        info!(execution = %execution.id, agent = %execution.agent_name, tasks = tasks.len(), "agent started");

        let run_fn = agent_runner(agent, execution.agent_name.clone());
        let exec_token = token.child_token();
        let mut handles = Vec::with_capacity(tasks.len());
        let mut cancelled = 0usize;
        for mut task in tasks {
            if task.status != ExecutionStatus::Pending {
                debug!(task = %task.id, status = %task.status, "task already settled");
                continue;
            }
            match self.scheduler.submit(task.clone(), run_fn.clone(), &exec_token) {
                Ok(handle) => handles.push(handle),
                Err(SchedulerError::Capacity { .. }) => {
                    task.finish(ExecutionStatus::Cancelled, None, Utc::now())?;
                    self.store.record_task(&task).await?;
                    cancelled += 1;
                }
                Err(error) => {
                    exec_token.cancel();
                    return Err(error.into());
                }
            }
        }

        let mut findings = Vec::new();
        let mut failed = 0usize;
        for handle in handles {
            let report = match handle.join().await {
                Ok(report) => report,
                Err(error) => {
                    exec_token.cancel();
                    return Err(error.into());
                }
            };
            match report.outcome {
                TaskOutcome::Completed(produced) => findings.extend(
                    produced
                        .into_iter()
                        .map(|f| f.with_agent(execution.agent_name.clone())),
                ),
                TaskOutcome::Failed(_) => failed += 1,
                TaskOutcome::Cancelled => cancelled += 1,
            }
        }

        let status = if failed > 0 {
            ExecutionStatus::Failed
        } else if cancelled > 0 {
            ExecutionStatus::Cancelled
        } else {
            ExecutionStatus::Completed
        };
        execution.transition(status, Utc::now())?;
        self.store.record_execution(execution).await?;

        if status == ExecutionStatus::Failed {
            warn!(execution = %execution.id, agent = %execution.agent_name, failed, "agent failed");
        } else {
            info!(execution = %execution.id, agent = %execution.agent_name, %status, findings = findings.len(), "agent finished");
        }
        Ok(ExecutionYield { source, findings })
    }
}

/// Per-attempt work for the tasks of one agent. An unregistered agent fails
/// every attempt permanently.
fn agent_runner(
    agent: Option<Arc<dyn Agent>>,
    name: String,
) -> impl Fn(AgentTask) -> AttemptFuture + Clone + Send + Sync + 'static {
    move |task: AgentTask| {
        let agent = agent.clone();
        let name = name.clone();
        Box::pin(async move {
            match agent {
                Some(agent) => agent.execute(&task).await,
                None => Err(TaskError::Permanent(format!("unknown agent '{name}'"))),
            }
        })
    }
}
