//! `agent_executions` table.

use argus_core::entities::AgentExecution;
use argus_core::enums::{EntityType, ExecutionStatus, TrailOp};

use crate::error::DatabaseError;
use crate::helpers::{
    get_unsigned, parse_datetime, parse_enum, parse_optional_datetime, to_sql_int,
};
use crate::store::ArgusStore;

const SELECT_COLS: &str = "id, run_id, agent_name, position, status, created_at, started_at, completed_at, duration_ms";

fn row_to_execution(row: &libsql::Row) -> Result<AgentExecution, DatabaseError> {
    let duration_ms = match row.get::<Option<i64>>(8)? {
        Some(ms) => Some(u64::try_from(ms).map_err(|_| {
            DatabaseError::Query(format!("negative duration_ms: {ms}"))
        })?),
        None => None,
    };
    Ok(AgentExecution {
        id: row.get(0)?,
        run_id: row.get(1)?,
        agent_name: row.get(2)?,
        position: get_unsigned(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        started_at: parse_optional_datetime(row.get::<Option<String>>(6)?.as_deref())?,
        completed_at: parse_optional_datetime(row.get::<Option<String>>(7)?.as_deref())?,
        duration_ms,
    })
}

impl ArgusStore {
    pub(crate) async fn upsert_execution(
        &self,
        execution: &AgentExecution,
    ) -> Result<(), DatabaseError> {
        self.write(
            &format!(
                "INSERT INTO agent_executions ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (id) DO UPDATE SET
                     status = excluded.status,
                     started_at = excluded.started_at,
                     completed_at = excluded.completed_at,
                     duration_ms = excluded.duration_ms"
            ),
            vec![
                execution.id.clone().into(),
                execution.run_id.clone().into(),
                execution.agent_name.clone().into(),
                i64::from(execution.position).into(),
                execution.status.as_str().into(),
                execution.created_at.to_rfc3339().into(),
                execution.started_at.map(|t| t.to_rfc3339()).into(),
                execution.completed_at.map(|t| t.to_rfc3339()).into(),
                execution.duration_ms.map(to_sql_int).into(),
            ],
        )
        .await?;

        let op = if execution.status == ExecutionStatus::Pending {
            TrailOp::Create
        } else {
            TrailOp::Transition
        };
        self.trail().record(
            &execution.run_id,
            op,
            EntityType::Execution,
            &execution.id,
            execution,
        )
    }

    pub(crate) async fn executions_for_run(
        &self,
        run_id: &str,
    ) -> Result<Vec<AgentExecution>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM agent_executions
                     WHERE run_id = ?1 ORDER BY position, rowid"
                ),
                [run_id],
            )
            .await?;
        let mut executions = Vec::new();
        while let Some(row) = rows.next().await? {
            executions.push(row_to_execution(&row)?);
        }
        Ok(executions)
    }

    /// Run that owns an execution, for routing task trail lines.
    pub(crate) async fn run_id_of_execution(
        &self,
        execution_id: &str,
    ) -> Result<String, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT run_id FROM agent_executions WHERE id = ?1",
                [execution_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("execution", execution_id))?;
        Ok(row.get::<String>(0)?)
    }
}
