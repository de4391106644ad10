//! `analysis_runs` table.

use argus_core::entities::AnalysisRun;
use argus_core::enums::{EntityType, RunStatus, TrailOp};

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum, parse_optional_datetime};
use crate::store::ArgusStore;

const SELECT_COLS: &str =
    "id, project_id, status, created_at, started_at, completed_at, aggregate_score";

fn row_to_run(row: &libsql::Row) -> Result<AnalysisRun, DatabaseError> {
    Ok(AnalysisRun {
        id: row.get(0)?,
        project_id: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        started_at: parse_optional_datetime(row.get::<Option<String>>(4)?.as_deref())?,
        completed_at: parse_optional_datetime(row.get::<Option<String>>(5)?.as_deref())?,
        aggregate_score: row.get::<Option<f64>>(6)?,
    })
}

impl ArgusStore {
    pub(crate) async fn upsert_run(&self, run: &AnalysisRun) -> Result<(), DatabaseError> {
        self.write(
            &format!(
                "INSERT INTO analysis_runs ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (id) DO UPDATE SET
                     status = excluded.status,
                     started_at = excluded.started_at,
                     completed_at = excluded.completed_at,
                     aggregate_score = excluded.aggregate_score"
            ),
            vec![
                run.id.clone().into(),
                run.project_id.clone().into(),
                run.status.as_str().into(),
                run.created_at.to_rfc3339().into(),
                run.started_at.map(|t| t.to_rfc3339()).into(),
                run.completed_at.map(|t| t.to_rfc3339()).into(),
                run.aggregate_score.into(),
            ],
        )
        .await?;

        let op = if run.status == RunStatus::Pending {
            TrailOp::Create
        } else {
            TrailOp::Transition
        };
        self.trail()
            .record(&run.id, op, EntityType::Run, &run.id, run)
    }

    pub(crate) async fn fetch_run(&self, run_id: &str) -> Result<AnalysisRun, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM analysis_runs WHERE id = ?1"),
                [run_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("run", run_id))?;
        row_to_run(&row)
    }

    /// Most recent runs first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is malformed.
    pub async fn recent_runs(&self, limit: u32) -> Result<Vec<AnalysisRun>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM analysis_runs
                     ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                ),
                [i64::from(limit)],
            )
            .await?;
        let mut runs = Vec::new();
        while let Some(row) = rows.next().await? {
            runs.push(row_to_run(&row)?);
        }
        Ok(runs)
    }

    /// The latest earlier completed or partial run of the same project.
    pub(crate) async fn previous_run_id(
        &self,
        run: &AnalysisRun,
    ) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id FROM analysis_runs
                 WHERE project_id = ?1 AND id != ?2 AND created_at <= ?3
                   AND status IN ('completed', 'partial')
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                libsql::params![
                    run.project_id.as_str(),
                    run.id.as_str(),
                    run.created_at.to_rfc3339()
                ],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use argus_core::store::RunStore;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn upsert_then_fetch_roundtrips() {
        let store = ArgusStore::in_memory().await.unwrap();
        let mut run = AnalysisRun::new("shop-api").unwrap();
        store.upsert_run(&run).await.unwrap();

        run.transition(RunStatus::Running, Utc::now()).unwrap();
        store.upsert_run(&run).await.unwrap();
        run.aggregate_score = Some(0.72);
        run.transition(RunStatus::Partial, Utc::now()).unwrap();
        store.upsert_run(&run).await.unwrap();

        let fetched = store.get_run(&run.id).await.unwrap();
        assert_eq!(fetched.status, RunStatus::Partial);
        assert_eq!(fetched.aggregate_score, Some(0.72));
        assert_eq!(fetched.started_at, run.started_at);
        assert_eq!(fetched.completed_at, run.completed_at);
    }

    #[tokio::test]
    async fn missing_run_is_not_found() {
        let store = ArgusStore::in_memory().await.unwrap();
        let err = store.fetch_run("run-00000000").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn recent_runs_newest_first() {
        let store = ArgusStore::in_memory().await.unwrap();
        let first = AnalysisRun::new("a").unwrap();
        store.upsert_run(&first).await.unwrap();
        let second = AnalysisRun::new("b").unwrap();
        store.upsert_run(&second).await.unwrap();

        let ids: Vec<String> = store
            .recent_runs(10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
