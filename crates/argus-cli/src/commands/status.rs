use argus_core::entities::{AgentExecution, AgentTask, AnalysisRun, RunSummary};
use argus_core::store::RunStore;
use argus_core::trail::TrailOperation;
use argus_db::trail::reader::read_run_trail;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StatusArgs;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::{Column, Tabular, output, score_cell};

const DEFAULT_RECENT: u32 = 20;

#[derive(Debug, Serialize)]
struct ExecutionDetail {
    #[serde(flatten)]
    execution: AgentExecution,
    tasks: Vec<AgentTask>,
}

#[derive(Debug, Serialize)]
struct RunDetail {
    run: AnalysisRun,
    executions: Vec<ExecutionDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trail: Option<Vec<TrailOperation>>,
}

impl Tabular for RunDetail {
    fn columns(&self) -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::text("agent"),
            Column::status("agent_status"),
            Column::text("target"),
            Column::status("task_status"),
            Column::number("attempts"),
            Column::wide("error"),
        ];
        COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        for detail in &self.executions {
            let agent = [
                detail.execution.agent_name.clone(),
                detail.execution.status.to_string(),
            ];
            if detail.tasks.is_empty() {
                rows.push([agent.to_vec(), vec!["-".to_string(); 4]].concat());
            }
            for task in &detail.tasks {
                rows.push(
                    [
                        agent.to_vec(),
                        vec![
                            task.target.clone(),
                            task.status.to_string(),
                            task.attempt_count.to_string(),
                            task.error_message.clone().unwrap_or_else(|| "-".to_string()),
                        ],
                    ]
                    .concat(),
                );
            }
        }
        rows
    }

    fn caption(&self) -> Option<String> {
        let findings = self
            .summary
            .as_ref()
            .map_or_else(|| "-".to_string(), |summary| summary.total.to_string());
        Some(format!(
            "run {} ({}) {}: {} findings, score {}",
            self.run.id,
            self.run.project_id,
            self.run.status,
            findings,
            score_cell(self.run.aggregate_score),
        ))
    }

    fn empty_note(&self) -> &'static str {
        "(no agents)"
    }
}

/// Most recent runs, newest first.
#[derive(Debug, Serialize)]
#[serde(transparent)]
struct RecentRuns(Vec<AnalysisRun>);

impl Tabular for RecentRuns {
    fn columns(&self) -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::text("id"),
            Column::text("project"),
            Column::status("status"),
            Column::text("started"),
            Column::number("score"),
        ];
        COLUMNS
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|run| {
                vec![
                    run.id.clone(),
                    run.project_id.clone(),
                    run.status.to_string(),
                    run.started_at.map_or_else(
                        || "-".to_string(),
                        |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    ),
                    score_cell(run.aggregate_score),
                ]
            })
            .collect()
    }

    fn empty_note(&self) -> &'static str {
        "(no runs)"
    }
}

/// Handle `argus status`.
pub async fn handle(args: &StatusArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match &args.run_id {
        Some(run_id) => {
            let detail = run_detail(ctx, run_id, args.trail).await?;
            output(&detail, flags.format)
        }
        None => {
            let limit = effective_limit(flags.limit, DEFAULT_RECENT);
            let runs = RecentRuns(ctx.store.recent_runs(limit).await?);
            output(&runs, flags.format)
        }
    }
}

async fn run_detail(ctx: &AppContext, run_id: &str, with_trail: bool) -> anyhow::Result<RunDetail> {
    let run = ctx.store.get_run(run_id).await?;

    let mut executions = Vec::new();
    for execution in ctx.store.list_executions(run_id).await? {
        let tasks = ctx.store.list_tasks(&execution.id).await?;
        executions.push(ExecutionDetail { execution, tasks });
    }

    let summary = ctx
        .store
        .load_results(run_id)
        .await?
        .map(|results| results.summary);

    let trail = if with_trail {
        Some(read_run_trail(&ctx.config.general.trail_dir(), run_id)?)
    } else {
        None
    };

    Ok(RunDetail {
        run,
        executions,
        summary,
        trail,
    })
}
