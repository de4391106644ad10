//! # argus-worker
//!
//! Orchestrates analysis runs. An [`AnalysisWorker`] takes a pending run,
//! executes its agents in creation order through the task scheduler, merges
//! everything they found and stores the result.
//!
//! Agents plug in through the [`Agent`] trait and are looked up by name in an
//! [`AgentRegistry`]. Two implementations ship here: [`CompletionAgent`]
//! (asks an AI completion service) and [`ReplayAgent`] (replays recorded
//! findings).

pub mod agent;
mod error;
pub mod plan;
mod worker;

pub use agent::{
    Agent, AgentKind, AgentRegistry, CompletionAgent, CompletionClient, CompletionError,
    ReplayAgent,
};
pub use error::WorkerError;
pub use plan::{AgentPlan, RunPlan, add_execution, add_task, create_run};
pub use worker::{AnalysisWorker, RunReport};
