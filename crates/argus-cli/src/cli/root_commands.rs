use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create a run from a plan file and execute it.
    Run(RunArgs),
    /// Merge finding sources into one deduplicated, scored list.
    Merge(MergeArgs),
    /// Score findings and report the confidence distribution.
    Score(ScoreArgs),
    /// Show one run in detail, or the most recent runs.
    Status(StatusArgs),
    /// Print the JSON schema of an entity type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    /// Plan JSON file: project plus agents with recorded findings.
    pub plan: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct MergeArgs {
    /// Finding source JSON files (`{"source": "static", "findings": [...]}`).
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Previous run's findings as a JSON array, for reproducibility scoring.
    #[arg(long)]
    pub history: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ScoreArgs {
    /// JSON array of raw findings.
    pub findings: PathBuf,

    /// Previous run's findings as a JSON array.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Only print the batch summary, not every scored finding.
    #[arg(long)]
    pub summary_only: bool,
}

#[derive(Clone, Debug, Args)]
pub struct StatusArgs {
    /// Run ID. Without one, recent runs are listed.
    pub run_id: Option<String>,

    /// Include the run's status trail.
    #[arg(long)]
    pub trail: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Run,
    Execution,
    Task,
    Finding,
    MergedFinding,
    Summary,
    Trail,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub type_name: SchemaType,
}
