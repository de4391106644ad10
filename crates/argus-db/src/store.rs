//! `RunStore` implementation over libSQL with the JSONL trail.

use argus_config::GeneralConfig;
use argus_core::entities::{
    AgentExecution, AgentTask, AnalysisRun, MergedFinding, RawFinding, RunSummary,
};
use argus_core::errors::StoreError;
use argus_core::store::{RunStore, StatusSink, StoredResults};
use async_trait::async_trait;
use tracing::debug;

use crate::ArgusDb;
use crate::error::DatabaseError;
use crate::retry::{self, RetryConfig};
use crate::trail::writer::TrailWriter;

/// Persists run state in libSQL and mirrors each write into the trail.
///
/// Every `record_*` call is an upsert of the full row followed by a trail
/// append, so the database always holds the latest state and the trail the
/// full history.
pub struct ArgusStore {
    db: ArgusDb,
    trail: TrailWriter,
    retry: RetryConfig,
}

impl ArgusStore {
    /// Open the store under `general.data_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory, database or trail cannot be
    /// created.
    pub async fn open(general: &GeneralConfig) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&general.data_dir)?;
        let path = general.database_path();
        let db = ArgusDb::open_local(&path.to_string_lossy()).await?;
        let trail = if general.trail_enabled {
            TrailWriter::new(general.trail_dir())?
        } else {
            TrailWriter::disabled()
        };
        debug!(path = %path.display(), trail = trail.is_enabled(), "store opened");
        Ok(Self::from_parts(db, trail))
    }

    /// In-memory database without a trail.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let db = ArgusDb::open_local(":memory:").await?;
        Ok(Self::from_parts(db, TrailWriter::disabled()))
    }

    #[must_use]
    pub fn from_parts(db: ArgusDb, trail: TrailWriter) -> Self {
        Self {
            db,
            trail,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub const fn db(&self) -> &ArgusDb {
        &self.db
    }

    #[must_use]
    pub const fn trail(&self) -> &TrailWriter {
        &self.trail
    }

    /// Execute a write statement, retrying while the database is busy.
    pub(crate) async fn write(
        &self,
        sql: &str,
        params: Vec<libsql::Value>,
    ) -> Result<u64, DatabaseError> {
        let conn = self.db.conn();
        let affected = retry::with_retry(&self.retry, move || conn.execute(sql, params.clone())).await?;
        Ok(affected)
    }
}

#[async_trait]
impl StatusSink for ArgusStore {
    async fn record_run(&self, run: &AnalysisRun) -> Result<(), StoreError> {
        Ok(self.upsert_run(run).await?)
    }

    async fn record_execution(&self, execution: &AgentExecution) -> Result<(), StoreError> {
        Ok(self.upsert_execution(execution).await?)
    }

    async fn record_task(&self, task: &AgentTask) -> Result<(), StoreError> {
        Ok(self.upsert_task(task).await?)
    }
}

#[async_trait]
impl RunStore for ArgusStore {
    async fn get_run(&self, run_id: &str) -> Result<AnalysisRun, StoreError> {
        Ok(self.fetch_run(run_id).await?)
    }

    async fn list_executions(&self, run_id: &str) -> Result<Vec<AgentExecution>, StoreError> {
        Ok(self.executions_for_run(run_id).await?)
    }

    async fn list_tasks(&self, execution_id: &str) -> Result<Vec<AgentTask>, StoreError> {
        Ok(self.tasks_for_execution(execution_id).await?)
    }

    async fn save_results(
        &self,
        run_id: &str,
        findings: &[MergedFinding],
        summary: &RunSummary,
    ) -> Result<(), StoreError> {
        Ok(self.store_results(run_id, findings, summary).await?)
    }

    async fn load_results(&self, run_id: &str) -> Result<Option<StoredResults>, StoreError> {
        Ok(self.fetch_results(run_id).await?)
    }

    async fn previous_findings(
        &self,
        run: &AnalysisRun,
    ) -> Result<Option<Vec<RawFinding>>, StoreError> {
        let Some(previous) = self.previous_run_id(run).await? else {
            return Ok(None);
        };
        let findings = self
            .fetch_results(&previous)
            .await?
            .map(|results| results.findings.into_iter().map(|m| m.finding).collect())
            .unwrap_or_default();
        Ok(Some(findings))
    }
}
