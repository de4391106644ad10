//! `run_results` table: merged findings and summary as JSON documents.

use argus_core::entities::{MergedFinding, RunSummary};
use argus_core::enums::{EntityType, TrailOp};
use argus_core::store::StoredResults;
use chrono::Utc;

use crate::error::DatabaseError;
use crate::helpers::to_sql_int;
use crate::store::ArgusStore;

impl ArgusStore {
    pub(crate) async fn store_results(
        &self,
        run_id: &str,
        findings: &[MergedFinding],
        summary: &RunSummary,
    ) -> Result<(), DatabaseError> {
        let findings_json = serde_json::to_string(findings)?;
        let summary_json = serde_json::to_string(summary)?;
        self.write(
            "INSERT INTO run_results (run_id, findings, summary, finding_count, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (run_id) DO UPDATE SET
                 findings = excluded.findings,
                 summary = excluded.summary,
                 finding_count = excluded.finding_count,
                 saved_at = excluded.saved_at",
            vec![
                run_id.into(),
                findings_json.into(),
                summary_json.into(),
                to_sql_int(findings.len()).into(),
                Utc::now().to_rfc3339().into(),
            ],
        )
        .await?;

        self.trail()
            .record(run_id, TrailOp::Results, EntityType::Run, run_id, summary)
    }

    pub(crate) async fn fetch_results(
        &self,
        run_id: &str,
    ) -> Result<Option<StoredResults>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT findings, summary FROM run_results WHERE run_id = ?1",
                [run_id],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let findings = serde_json::from_str(&row.get::<String>(0)?)?;
        let summary = serde_json::from_str(&row.get::<String>(1)?)?;
        Ok(Some(StoredResults { findings, summary }))
    }
}
