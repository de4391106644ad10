//! In-memory `RunStore` for tests and embedding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{RunStore, StatusSink, StoredResults};
use crate::entities::{
    AgentExecution, AgentTask, AnalysisRun, MergedFinding, RawFinding, RunSummary,
};
use crate::enums::RunStatus;
use crate::errors::StoreError;

#[derive(Default)]
struct MemoryState {
    runs: HashMap<String, AnalysisRun>,
    executions: Vec<AgentExecution>,
    tasks: Vec<AgentTask>,
    results: HashMap<String, StoredResults>,
    task_log: Vec<AgentTask>,
}

/// Keeps every row in process memory.
///
/// Besides the current row state it keeps a log of every task snapshot it
/// was handed, and can be switched offline to simulate an unreachable store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    offline: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When offline, every call fails with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every task snapshot recorded so far, in arrival order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store is offline.
    pub fn task_log(&self) -> Result<Vec<AgentTask>, StoreError> {
        Ok(self.state()?.task_log.clone())
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        self.state
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("memory store lock poisoned: {e}")))
    }
}

fn upsert<T: Clone>(rows: &mut Vec<T>, row: &T, same: impl Fn(&T) -> bool) {
    if let Some(existing) = rows.iter_mut().find(|r| same(r)) {
        *existing = row.clone();
    } else {
        rows.push(row.clone());
    }
}

#[async_trait]
impl StatusSink for MemoryStore {
    async fn record_run(&self, run: &AnalysisRun) -> Result<(), StoreError> {
        self.state()?.runs.insert(run.id.clone(), run.clone());
        Ok(())
    }

    async fn record_execution(&self, execution: &AgentExecution) -> Result<(), StoreError> {
        let mut state = self.state()?;
        upsert(&mut state.executions, execution, |e| e.id == execution.id);
        Ok(())
    }

    async fn record_task(&self, task: &AgentTask) -> Result<(), StoreError> {
        let mut state = self.state()?;
        upsert(&mut state.tasks, task, |t| t.id == task.id);
        state.task_log.push(task.clone());
        Ok(())
    }
}

#[async_trait]
impl RunStore for MemoryStore {
    async fn get_run(&self, run_id: &str) -> Result<AnalysisRun, StoreError> {
        self.state()?
            .runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("run", run_id))
    }

    async fn list_executions(&self, run_id: &str) -> Result<Vec<AgentExecution>, StoreError> {
        let mut executions: Vec<AgentExecution> = self
            .state()?
            .executions
            .iter()
            .filter(|e| e.run_id == run_id)
            .cloned()
            .collect();
        executions.sort_by_key(|e| e.position);
        Ok(executions)
    }

    async fn list_tasks(&self, execution_id: &str) -> Result<Vec<AgentTask>, StoreError> {
        Ok(self
            .state()?
            .tasks
            .iter()
            .filter(|t| t.execution_id == execution_id)
            .cloned()
            .collect())
    }

    async fn save_results(
        &self,
        run_id: &str,
        findings: &[MergedFinding],
        summary: &RunSummary,
    ) -> Result<(), StoreError> {
        self.state()?.results.insert(
            run_id.to_string(),
            StoredResults {
                findings: findings.to_vec(),
                summary: summary.clone(),
            },
        );
        Ok(())
    }

    async fn load_results(&self, run_id: &str) -> Result<Option<StoredResults>, StoreError> {
        Ok(self.state()?.results.get(run_id).cloned())
    }

    async fn previous_findings(
        &self,
        run: &AnalysisRun,
    ) -> Result<Option<Vec<RawFinding>>, StoreError> {
        let state = self.state()?;
        let previous = state
            .runs
            .values()
            .filter(|r| {
                r.project_id == run.project_id
                    && r.id != run.id
                    && r.created_at <= run.created_at
                    && matches!(r.status, RunStatus::Completed | RunStatus::Partial)
            })
            .max_by_key(|r| r.created_at);

        Ok(previous.map(|prior| {
            state
                .results
                .get(&prior.id)
                .map(|results| {
                    results
                        .findings
                        .iter()
                        .map(|merged| merged.finding.clone())
                        .collect()
                })
                .unwrap_or_default()
        }))
    }
}
