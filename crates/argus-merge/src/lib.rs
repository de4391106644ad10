//! # argus-merge
//!
//! Deduplicates and arbitrates findings from static, rule-engine and AI
//! sources into one ranked list with a run summary.
//!
//! - [`similarity()`] scores how alike two findings are
//! - [`ResultMerger`] folds duplicates and records [`ConflictInfo`]s
//! - [`ConflictResolver`] settles conflicts left open after merging
//! - [`generate_summary`] rolls up the final list

mod conflict;
mod error;
mod merger;
mod similarity;
mod source;

pub use conflict::{ConflictField, ConflictInfo, ConflictResolver, ConflictValue, ResolutionRule};
pub use error::MergeInputError;
pub use merger::{DroppedFinding, MergeOutcome, ResultMerger};
pub use similarity::{message_jaccard, similarity};
pub use source::FindingSource;

use argus_core::entities::{MergedFinding, RunSummary};

/// Counts by severity, category and source, mean confidence and the
/// action-required count, computed from the final merged list only.
#[must_use]
pub fn generate_summary(findings: &[MergedFinding]) -> RunSummary {
    RunSummary::from_findings(findings)
}
