use argus_config::ArgusConfig;
use argus_merge::{FindingSource, MergeOutcome, ResultMerger};
use tracing::info;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MergeArgs;
use crate::commands::shared::input::{read_history, read_json};
use crate::output::output;

/// Handle `argus merge`.
pub fn handle(args: &MergeArgs, config: &ArgusConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let outcome = merge_files(args, config)?;
    output(&outcome, flags.format)
}

fn merge_files(args: &MergeArgs, config: &ArgusConfig) -> anyhow::Result<MergeOutcome> {
    let sources = args
        .sources
        .iter()
        .map(|path| read_json::<FindingSource>(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let history = read_history(args.history.as_deref())?;

    let merger = ResultMerger::new(config.merge.clone(), config.confidence.clone());
    let outcome = merger.merge(sources, history.as_deref());
    info!(
        findings = outcome.findings.len(),
        conflicts = outcome.conflicts.len(),
        dropped = outcome.dropped.len(),
        "merge finished"
    );
    Ok(outcome)
}
