//! JSONL trail writer.
//!
//! Appends `TrailOperation` records to per-run `{trail_dir}/{run_id}.jsonl`
//! files. Uses `serde_jsonlines::append_json_lines` for per-line appends.

use std::path::{Path, PathBuf};

use argus_core::enums::{EntityType, TrailOp};
use argus_core::trail::TrailOperation;
use chrono::Utc;
use serde::Serialize;

use crate::error::DatabaseError;

/// Appends trail operations to per-run JSONL files.
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a new `TrailWriter` pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Trail` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&trail_dir)?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// Create a disabled writer (for tests or when the trail is turned off).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a trail operation to the run's JSONL file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Trail` if the file write fails.
    pub fn append(&self, op: &TrailOperation) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.path_for(&op.run);
        serde_jsonlines::append_json_lines(&path, [op])?;
        Ok(())
    }

    /// Build and append an operation carrying the full state of `entity`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Json` if `entity` cannot be serialized, or
    /// `DatabaseError::Trail` if the write fails.
    pub fn record<T: Serialize>(
        &self,
        run_id: &str,
        op: TrailOp,
        entity_type: EntityType,
        id: &str,
        entity: &T,
    ) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }
        self.append(&TrailOperation {
            v: 1,
            ts: Utc::now().to_rfc3339(),
            run: run_id.to_string(),
            op,
            entity: entity_type,
            id: id.to_string(),
            data: serde_json::to_value(entity)?,
        })
    }

    /// The directory where trail files are stored.
    #[must_use]
    pub fn trail_dir(&self) -> &Path {
        &self.trail_dir
    }

    #[must_use]
    pub fn path_for(&self, run_id: &str) -> PathBuf {
        self.trail_dir.join(format!("{run_id}.jsonl"))
    }
}
