//! # argus-confidence
//!
//! Maps a raw finding, optionally with the previous run's findings, to a
//! calibrated confidence score in [0, 1].
//!
//! ```text
//! overall = clamp01(rule_based * 0.50
//!                 + ast_evidence * 0.20
//!                 + reproducibility * 0.20
//!                 - ai_penalty * 0.10
//!                 - change_penalty * 0.10)
//! ```
//!
//! The weights are fixed. Level thresholds, the evidence normalizer and the
//! filter minimums come from [`argus_config::ConfidenceConfig`].

mod batch;
mod calculator;
mod filter;

pub use batch::{BatchReport, ScoredFinding};
pub use calculator::{ConfidenceCalculator, clamp01};
pub use filter::{ConfidenceFilter, FilterOutcome};
