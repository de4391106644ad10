//! Agents: the pluggable units that turn one task target into findings.

mod completion;
mod replay;

pub use completion::{CompletionAgent, CompletionClient, CompletionError};
pub use replay::{ALL_TARGETS, ReplayAgent};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use argus_core::entities::{AgentTask, RawFinding};
use argus_core::enums::SourceKind;
use argus_core::errors::TaskError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An analysis unit executed once per task.
///
/// Implementations report retryable failures as `TaskError::Transient` and
/// bad input or output as `TaskError::Permanent`.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    /// Kind of source the agent's findings are merged as.
    fn source(&self) -> SourceKind;

    async fn execute(&self, task: &AgentTask) -> Result<Vec<RawFinding>, TaskError>;
}

/// The built-in analysis areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Structure,
    Quality,
    Security,
    Dependency,
    Style,
    Test,
}

impl AgentKind {
    pub const ALL: [Self; 6] = [
        Self::Structure,
        Self::Quality,
        Self::Security,
        Self::Dependency,
        Self::Style,
        Self::Test,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Quality => "quality",
            Self::Security => "security",
            Self::Dependency => "dependency",
            Self::Style => "style",
            Self::Test => "test",
        }
    }

    /// What the agent looks for, used as the focus of its completion prompt.
    #[must_use]
    pub const fn focus(self) -> &'static str {
        match self {
            Self::Structure => "module boundaries, layering violations and circular dependencies",
            Self::Quality => "complexity, duplication, dead code and error handling gaps",
            Self::Security => "injection, authentication, secrets and unsafe data handling",
            Self::Dependency => "outdated, vulnerable or unused dependencies",
            Self::Style => "naming, formatting and consistency with project conventions",
            Self::Test => "missing tests, weak assertions and untested edge cases",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown agent kind: {s}"))
    }
}

/// Lookup table from agent name to agent, built once at startup.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, Arc<dyn Agent>>,
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AgentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `agent` under its own name, replacing any previous one.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.name().to_string(), agent);
    }

    #[must_use]
    pub fn with(mut self, agent: Arc<dyn Agent>) -> Self {
        self.register(agent);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
