//! General application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_data_dir() -> String {
    ".argus".to_string()
}

fn default_database_file() -> String {
    "argus.db".to_string()
}

const fn default_trail_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Directory holding the database and the per-run trail files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Database file name inside `data_dir`.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Whether status transitions are mirrored to `trail/{run_id}.jsonl`.
    #[serde(default = "default_trail_enabled")]
    pub trail_enabled: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: default_database_file(),
            trail_enabled: default_trail_enabled(),
        }
    }
}

impl GeneralConfig {
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.database_file)
    }

    #[must_use]
    pub fn trail_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("trail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.data_dir, ".argus");
        assert!(config.trail_enabled);
        assert_eq!(config.database_path(), PathBuf::from(".argus/argus.db"));
        assert_eq!(config.trail_dir(), PathBuf::from(".argus/trail"));
    }
}
