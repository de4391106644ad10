use argus_core::entities::{
    AgentExecution, AgentTask, AnalysisRun, MergedFinding, RawFinding, RunSummary,
};
use argus_core::trail::TrailOperation;
use schemars::{Schema, schema_for};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `argus schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_of(args.type_name), flags.format)
}

fn schema_of(type_name: SchemaType) -> Schema {
    match type_name {
        SchemaType::Run => schema_for!(AnalysisRun),
        SchemaType::Execution => schema_for!(AgentExecution),
        SchemaType::Task => schema_for!(AgentTask),
        SchemaType::Finding => schema_for!(RawFinding),
        SchemaType::MergedFinding => schema_for!(MergedFinding),
        SchemaType::Summary => schema_for!(RunSummary),
        SchemaType::Trail => schema_for!(TrailOperation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_schema_requires_core_fields() {
        let schema = serde_json::to_value(schema_of(SchemaType::Finding)).unwrap();
        let required = schema["required"].as_array().unwrap();
        for field in ["category", "severity", "file_path", "message"] {
            assert!(required.iter().any(|v| v == field), "missing {field}");
        }
    }

    #[test]
    fn run_schema_names_its_type() {
        let schema = serde_json::to_value(schema_of(SchemaType::Run)).unwrap();
        assert_eq!(schema["title"], "AnalysisRun");
    }
}
