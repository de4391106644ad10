//! Cross-cutting error types for Argus.
//!
//! This module defines errors that can originate from any crate in the system.
//! Domain-specific errors (e.g., `SchedulerError`, `DatabaseError`) are defined in
//! their respective crates. The CLI converges everything through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Argus crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (schema, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors surfaced by a `StatusSink` or `RunStore` implementation.
///
/// Any of these reaching the worker is a run-level failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The requested row does not exist.
    #[error("Not found in store: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A stored row could not be decoded.
    #[error("Corrupt store data: {0}")]
    Corrupt(String),
}

impl StoreError {
    #[must_use]
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

/// Failure of a single agent task attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Network-class failure; eligible for retry.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The attempt exceeded its time budget; eligible for retry.
    #[error("task timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Unknown agent, malformed task or unparseable output; never retried.
    #[error("permanent failure: {0}")]
    Permanent(String),
}

impl TaskError {
    /// Whether the scheduler may re-enqueue the task after this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout { .. })
    }
}
