use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use argus_config::ArgusConfig;
use argus_db::ArgusStore;
use argus_worker::{AnalysisWorker, RunPlan, RunReport};
use tracing::{debug, info, warn};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RunArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `argus run`.
pub async fn handle(args: &RunArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = execute_plan(&args.plan, Arc::clone(&ctx.store), &ctx.config).await?;
    output(&report, flags.format)
}

/// Record the plan as a new run and drive it to a terminal state.
///
/// Ctrl-C cancels the run; executions that already finished keep their
/// findings in the report.
pub async fn execute_plan(
    plan_path: &Path,
    store: Arc<ArgusStore>,
    config: &ArgusConfig,
) -> anyhow::Result<RunReport> {
    let plan = RunPlan::from_file(plan_path)?;
    let base_dir = plan_path.parent().unwrap_or_else(|| Path::new("."));
    let registry = plan.registry(base_dir)?;
    debug!(agents = registry.len(), "agent registry built");

    let run = plan
        .create(store.as_ref())
        .await
        .context("failed to record run")?;
    info!(run = %run.id, project = %run.project_id, "run created");

    let worker = Arc::new(AnalysisWorker::new(store, registry, config)?);
    let interrupt = {
        let worker = Arc::clone(&worker);
        let run_id = run.id.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(run = %run_id, "interrupted, cancelling run");
                if let Err(error) = worker.cancel_run(&run_id) {
                    debug!(%error, "nothing to cancel");
                }
            }
        })
    };

    let report = worker.execute_run(&run.id).await;
    interrupt.abort();
    let report = report.with_context(|| format!("run {} failed", run.id))?;
    info!(
        run = %report.run.id,
        status = %report.run.status,
        findings = report.findings.len(),
        "run finished"
    );
    Ok(report)
}
