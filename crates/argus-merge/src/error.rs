//! Merge input validation errors.

use argus_core::entities::RawFinding;

/// A raw finding that cannot take part in a merge.
///
/// The merger drops the offending finding, logs the reason and continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeInputError {
    #[error("finding {finding_id} has an empty file path")]
    EmptyFilePath { finding_id: String },

    #[error("finding {finding_id} has an empty message")]
    EmptyMessage { finding_id: String },

    #[error("finding {finding_id} ends at line {end} before it starts at line {start}")]
    InvertedLines {
        finding_id: String,
        start: u32,
        end: u32,
    },

    #[error("finding {finding_id} has a non-finite AI confidence")]
    InvalidAiConfidence { finding_id: String },

    #[error("could not assign an id to a finding in {file_path}: {reason}")]
    Identity { file_path: String, reason: String },
}

impl MergeInputError {
    /// Check the fields the merger relies on.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn check(finding: &RawFinding) -> Result<(), Self> {
        let finding_id = || finding.id.clone();
        if finding.file_path.trim().is_empty() {
            return Err(Self::EmptyFilePath {
                finding_id: finding_id(),
            });
        }
        if finding.message.trim().is_empty() {
            return Err(Self::EmptyMessage {
                finding_id: finding_id(),
            });
        }
        if let (Some(start), Some(end)) = (finding.line_start, finding.line_end) {
            if end < start {
                return Err(Self::InvertedLines {
                    finding_id: finding_id(),
                    start,
                    end,
                });
            }
        }
        if finding.ai_confidence.is_some_and(|c| !c.is_finite()) {
            return Err(Self::InvalidAiConfidence {
                finding_id: finding_id(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::enums::{FindingCategory, Severity};

    fn finding() -> RawFinding {
        RawFinding::new(FindingCategory::Quality, Severity::Low, "a.rs", "unused import")
            .with_id("fnd-00000001")
    }

    #[test]
    fn valid_finding_passes() {
        assert!(MergeInputError::check(&finding()).is_ok());
    }

    #[test]
    fn rejects_blank_path_and_message() {
        let mut f = finding();
        f.file_path = "  ".into();
        assert!(matches!(
            MergeInputError::check(&f),
            Err(MergeInputError::EmptyFilePath { .. })
        ));

        let mut f = finding();
        f.message = String::new();
        assert!(matches!(
            MergeInputError::check(&f),
            Err(MergeInputError::EmptyMessage { .. })
        ));
    }

    #[test]
    fn rejects_inverted_lines_and_nan_confidence() {
        let f = finding().with_lines(9, 3);
        assert_eq!(
            MergeInputError::check(&f).unwrap_err().to_string(),
            "finding fnd-00000001 ends at line 3 before it starts at line 9"
        );

        let f = finding().with_ai_confidence(f64::NAN);
        assert!(matches!(
            MergeInputError::check(&f),
            Err(MergeInputError::InvalidAiConfidence { .. })
        ));
    }
}
