//! Run setup: creating run, execution and task rows, and declarative plans.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use argus_core::entities::{AgentExecution, AgentTask, AnalysisRun};
use argus_core::enums::SourceKind;
use argus_core::store::{RunStore, StatusSink};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::WorkerError;
use crate::agent::{ALL_TARGETS, AgentRegistry, ReplayAgent};

/// Create and record a pending run for `project_id`.
///
/// # Errors
///
/// Returns `WorkerError::Store` if the row cannot be written.
pub async fn create_run<S: StatusSink + ?Sized>(
    sink: &S,
    project_id: &str,
) -> Result<AnalysisRun, WorkerError> {
    let run = AnalysisRun::new(project_id)?;
    sink.record_run(&run).await?;
    Ok(run)
}

/// Append an execution of `agent_name` to `run`, after any existing ones.
///
/// # Errors
///
/// Returns `WorkerError::Store` if the executions cannot be listed or the row
/// cannot be written.
pub async fn add_execution<S: RunStore + ?Sized>(
    store: &S,
    run: &AnalysisRun,
    agent_name: &str,
) -> Result<AgentExecution, WorkerError> {
    let position = store
        .list_executions(&run.id)
        .await?
        .iter()
        .map(|e| e.position + 1)
        .max()
        .unwrap_or(0);
    let execution = AgentExecution::new(&run.id, agent_name, position)?;
    store.record_execution(&execution).await?;
    Ok(execution)
}

/// Add a pending task for `target` to `execution`.
///
/// # Errors
///
/// Returns `WorkerError::Store` if the row cannot be written.
pub async fn add_task<S: StatusSink + ?Sized>(
    sink: &S,
    execution: &AgentExecution,
    target: &str,
) -> Result<AgentTask, WorkerError> {
    let task = AgentTask::new(&execution.id, target)?;
    sink.record_task(&task).await?;
    Ok(task)
}

/// One agent of a [`RunPlan`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentPlan {
    pub name: String,
    pub source: SourceKind,
    /// JSONL file of recorded findings replayed by this agent. Relative paths
    /// resolve against the plan's directory.
    #[serde(default)]
    pub findings: Option<PathBuf>,
    /// One task per target. Empty means a single task over everything.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Declarative description of a run.
///
/// ```json
/// {
///   "project": "shop-api",
///   "agents": [
///     { "name": "security", "source": "rule", "findings": "security.jsonl", "targets": ["src/auth/"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunPlan {
    pub project: String,
    pub agents: Vec<AgentPlan>,
}

impl RunPlan {
    /// Read a plan from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Plan` if the file is unreadable or not a plan.
    pub fn from_file(path: &Path) -> Result<Self, WorkerError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| WorkerError::Plan(format!("{}: {e}", path.display())))?;
        let plan: Self = serde_json::from_str(&text)
            .map_err(|e| WorkerError::Plan(format!("{}: {e}", path.display())))?;
        if plan.agents.is_empty() {
            return Err(WorkerError::Plan(format!("{}: plan has no agents", path.display())));
        }
        Ok(plan)
    }

    /// Build replay agents for every agent with a findings file.
    ///
    /// Agents without one stay unregistered, so their tasks fail as unknown.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Plan` if a findings file cannot be loaded.
    pub fn registry(&self, base_dir: &Path) -> Result<AgentRegistry, WorkerError> {
        let mut registry = AgentRegistry::new();
        for agent in &self.agents {
            let Some(findings) = &agent.findings else {
                warn!(agent = %agent.name, "no findings file, agent will fail");
                continue;
            };
            let path = base_dir.join(findings);
            let replay = ReplayAgent::from_jsonl(&agent.name, agent.source, &path)?;
            registry.register(Arc::new(replay));
        }
        Ok(registry)
    }

    /// Record the run with one execution per agent, in plan order.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Store` if any row cannot be written.
    pub async fn create<S: RunStore + ?Sized>(&self, store: &S) -> Result<AnalysisRun, WorkerError> {
        let run = create_run(store, &self.project).await?;
        for agent in &self.agents {
            let execution = add_execution(store, &run, &agent.name).await?;
            if agent.targets.is_empty() {
                add_task(store, &execution, ALL_TARGETS).await?;
            }
            for target in &agent.targets {
                add_task(store, &execution, target).await?;
            }
        }
        Ok(run)
    }
}
