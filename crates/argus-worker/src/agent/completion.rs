use std::sync::Arc;

use argus_core::entities::{AgentTask, RawFinding};
use argus_core::enums::SourceKind;
use argus_core::errors::TaskError;
use async_trait::async_trait;
use tracing::debug;

use super::{Agent, AgentKind};

/// Failure of the completion service. Always treated as retryable.
#[derive(Debug, Clone, thiserror::Error)]
#[error("completion request failed: {0}")]
pub struct CompletionError(pub String);

/// The AI completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, CompletionError>;
}

/// AI-sourced agent that asks a completion service for findings.
///
/// The service must answer with a JSON array of findings, optionally inside a
/// fenced code block.
pub struct CompletionAgent {
    kind: AgentKind,
    client: Arc<dyn CompletionClient>,
}

impl CompletionAgent {
    #[must_use]
    pub fn new(kind: AgentKind, client: Arc<dyn CompletionClient>) -> Self {
        Self { kind, client }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are the {kind} reviewer of a code analysis pipeline. Look for {focus}. \
             Answer with a JSON array only. Each element has the fields category, severity, \
             file_path, line_start, line_end, message, suggestion, ai_explanation and \
             ai_confidence (a number between 0 and 1). Answer [] when nothing is found.",
            kind = self.kind,
            focus = self.kind.focus(),
        )
    }
}

/// Strip a surrounding Markdown code fence, if any.
fn unfence(output: &str) -> &str {
    let trimmed = output.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_suffix("```").unwrap_or(body);
    // Drop the info string (e.g. `json`) on the opening line.
    body.split_once('\n').map_or(body, |(_, rest)| rest).trim()
}

fn parse_findings(output: &str) -> Result<Vec<RawFinding>, TaskError> {
    serde_json::from_str(unfence(output))
        .map_err(|e| TaskError::Permanent(format!("malformed completion output: {e}")))
}

#[async_trait]
impl Agent for CompletionAgent {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn source(&self) -> SourceKind {
        SourceKind::Ai
    }

    async fn execute(&self, task: &AgentTask) -> Result<Vec<RawFinding>, TaskError> {
        let user_prompt = format!("Review the code under `{}`.", task.target);
        let output = self
            .client
            .complete(&self.system_prompt(), &user_prompt)
            .await
            .map_err(|e| TaskError::Transient(e.to_string()))?;
        let findings = parse_findings(&output)?;
        debug!(agent = %self.kind, target = %task.target, count = findings.len(), "completion parsed");
        Ok(findings)
    }
}
