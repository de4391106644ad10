use std::path::Path;

use anyhow::Context;
use argus_core::entities::RawFinding;
use serde::de::DeserializeOwned;

/// Read and deserialize a JSON file, naming the file in any error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Optional previous-run findings. A missing flag means no history at all,
/// which is different from an empty history file.
pub fn read_history(path: Option<&Path>) -> anyhow::Result<Option<Vec<RawFinding>>> {
    path.map(read_json::<Vec<RawFinding>>).transpose()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_findings_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"category":"security","severity":"high","file_path":"auth.ts","message":"hardcoded secret"}]"#,
        )
        .unwrap();

        let history = read_history(Some(&path)).unwrap().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].file_path, "auth.ts");
    }

    #[test]
    fn no_history_flag_is_none() {
        assert_eq!(read_history(None).unwrap(), None);
    }

    #[test]
    fn errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = read_json::<Vec<RawFinding>>(&path).unwrap_err();
        assert!(format!("{error:#}").contains("broken.json"));

        let missing = read_json::<Vec<RawFinding>>(&dir.path().join("absent.json")).unwrap_err();
        assert!(missing.to_string().contains("failed to read"));
    }
}
