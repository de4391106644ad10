//! `agent_tasks` table.

use argus_core::entities::AgentTask;
use argus_core::enums::{EntityType, ExecutionStatus, TrailOp};

use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, get_unsigned, parse_datetime, parse_enum, parse_optional_datetime,
};
use crate::store::ArgusStore;

const SELECT_COLS: &str = "id, execution_id, target, status, created_at, started_at, completed_at, error_message, attempt_count";

fn row_to_task(row: &libsql::Row) -> Result<AgentTask, DatabaseError> {
    Ok(AgentTask {
        id: row.get(0)?,
        execution_id: row.get(1)?,
        target: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        started_at: parse_optional_datetime(row.get::<Option<String>>(5)?.as_deref())?,
        completed_at: parse_optional_datetime(row.get::<Option<String>>(6)?.as_deref())?,
        error_message: get_opt_string(row, 7)?,
        attempt_count: get_unsigned(row, 8)?,
    })
}

impl ArgusStore {
    pub(crate) async fn upsert_task(&self, task: &AgentTask) -> Result<(), DatabaseError> {
        self.write(
            &format!(
                "INSERT INTO agent_tasks ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (id) DO UPDATE SET
                     status = excluded.status,
                     started_at = excluded.started_at,
                     completed_at = excluded.completed_at,
                     error_message = excluded.error_message,
                     attempt_count = excluded.attempt_count"
            ),
            vec![
                task.id.clone().into(),
                task.execution_id.clone().into(),
                task.target.clone().into(),
                task.status.as_str().into(),
                task.created_at.to_rfc3339().into(),
                task.started_at.map(|t| t.to_rfc3339()).into(),
                task.completed_at.map(|t| t.to_rfc3339()).into(),
                task.error_message.clone().into(),
                i64::from(task.attempt_count).into(),
            ],
        )
        .await?;

        if !self.trail().is_enabled() {
            return Ok(());
        }
        let run_id = self.run_id_of_execution(&task.execution_id).await?;
        let op = if task.status == ExecutionStatus::Pending && task.attempt_count == 0 {
            TrailOp::Create
        } else {
            TrailOp::Transition
        };
        self.trail()
            .record(&run_id, op, EntityType::Task, &task.id, task)
    }

    pub(crate) async fn tasks_for_execution(
        &self,
        execution_id: &str,
    ) -> Result<Vec<AgentTask>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM agent_tasks
                     WHERE execution_id = ?1 ORDER BY created_at, rowid"
                ),
                [execution_id],
            )
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }
}
