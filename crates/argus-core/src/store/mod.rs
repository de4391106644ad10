//! Persistence seam shared by the scheduler and the worker.
//!
//! `StatusSink` is the narrow write-only interface the scheduler needs to
//! publish task transitions. `RunStore` adds the reads and result storage the
//! worker needs. Every transition is written as it happens so progress is
//! observable mid-run.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{
    AgentExecution, AgentTask, AnalysisRun, MergedFinding, RawFinding, RunSummary,
};
use crate::errors::StoreError;

/// Receives every status transition of runs, executions and tasks.
///
/// Each call is an upsert of the full row; implementations must provide
/// read-after-write consistency on a single row.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn record_run(&self, run: &AnalysisRun) -> Result<(), StoreError>;

    async fn record_execution(&self, execution: &AgentExecution) -> Result<(), StoreError>;

    async fn record_task(&self, task: &AgentTask) -> Result<(), StoreError>;
}

/// Final output of a run as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredResults {
    pub findings: Vec<MergedFinding>,
    pub summary: RunSummary,
}

/// Full store used by the analysis worker.
#[async_trait]
pub trait RunStore: StatusSink {
    async fn get_run(&self, run_id: &str) -> Result<AnalysisRun, StoreError>;

    /// Executions of a run in creation order (ascending `position`).
    async fn list_executions(&self, run_id: &str) -> Result<Vec<AgentExecution>, StoreError>;

    /// Tasks of an execution in creation order.
    async fn list_tasks(&self, execution_id: &str) -> Result<Vec<AgentTask>, StoreError>;

    async fn save_results(
        &self,
        run_id: &str,
        findings: &[MergedFinding],
        summary: &RunSummary,
    ) -> Result<(), StoreError>;

    async fn load_results(&self, run_id: &str) -> Result<Option<StoredResults>, StoreError>;

    /// Findings of the most recent earlier completed or partial run of the
    /// same project. `None` when no such run exists.
    async fn previous_findings(
        &self,
        run: &AnalysisRun,
    ) -> Result<Option<Vec<RawFinding>>, StoreError>;
}
