use std::path::Path;

use argus_core::entities::{AgentTask, RawFinding};
use argus_core::enums::SourceKind;
use argus_core::errors::TaskError;
use async_trait::async_trait;

use super::Agent;
use crate::WorkerError;

/// Target that selects every recorded finding.
pub const ALL_TARGETS: &str = "*";

/// Replays findings recorded ahead of time, e.g. by an external scanner.
///
/// A task receives the findings whose file path starts with its target.
#[derive(Debug, Clone)]
pub struct ReplayAgent {
    name: String,
    source: SourceKind,
    findings: Vec<RawFinding>,
}

impl ReplayAgent {
    #[must_use]
    pub fn new(name: impl Into<String>, source: SourceKind, findings: Vec<RawFinding>) -> Self {
        Self {
            name: name.into(),
            source,
            findings,
        }
    }

    /// Load findings from a JSONL file, one finding per line.
    ///
    /// # Errors
    ///
    /// Returns `WorkerError::Plan` if the file cannot be read or a line is
    /// not a finding.
    pub fn from_jsonl(
        name: impl Into<String>,
        source: SourceKind,
        path: &Path,
    ) -> Result<Self, WorkerError> {
        let findings = serde_jsonlines::json_lines::<RawFinding, _>(path)
            .and_then(Iterator::collect::<std::io::Result<Vec<RawFinding>>>)
            .map_err(|e| WorkerError::Plan(format!("{}: {e}", path.display())))?;
        Ok(Self::new(name, source, findings))
    }

    #[must_use]
    pub fn recorded(&self) -> &[RawFinding] {
        &self.findings
    }
}

#[async_trait]
impl Agent for ReplayAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> SourceKind {
        self.source
    }

    async fn execute(&self, task: &AgentTask) -> Result<Vec<RawFinding>, TaskError> {
        let all = task.target == ALL_TARGETS;
        Ok(self
            .findings
            .iter()
            .filter(|f| all || f.file_path.starts_with(&task.target))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use argus_core::enums::{FindingCategory, Severity};
    use pretty_assertions::assert_eq;

    use super::*;

    fn finding(path: &str) -> RawFinding {
        RawFinding::new(FindingCategory::Quality, Severity::Low, path, "long function")
    }

    #[tokio::test]
    async fn filters_by_target_prefix() {
        let agent = ReplayAgent::new(
            "quality",
            SourceKind::Rule,
            vec![finding("src/a.rs"), finding("src/b/c.rs"), finding("tests/t.rs")],
        );

        let src = AgentTask::new("exe-1", "src/").unwrap();
        let paths: Vec<String> = agent
            .execute(&src)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.file_path)
            .collect();
        assert_eq!(paths, vec!["src/a.rs", "src/b/c.rs"]);

        let every = AgentTask::new("exe-1", ALL_TARGETS).unwrap();
        assert_eq!(agent.execute(&every).await.unwrap().len(), 3);
    }

    #[test]
    fn loads_jsonl_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quality.jsonl");
        serde_jsonlines::write_json_lines(&path, [finding("src/a.rs"), finding("src/b.rs")]).unwrap();

        let agent = ReplayAgent::from_jsonl("quality", SourceKind::Static, &path).unwrap();
        assert_eq!(agent.recorded().len(), 2);
        assert_eq!(agent.source(), SourceKind::Static);
    }

    #[test]
    fn missing_file_is_a_plan_error() {
        let err = ReplayAgent::from_jsonl("x", SourceKind::Rule, Path::new("/nonexistent/x.jsonl"))
            .unwrap_err();
        assert!(matches!(err, WorkerError::Plan(_)));
    }
}
