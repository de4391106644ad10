//! # argus-scheduler
//!
//! Agent-agnostic task execution for Argus.
//!
//! A [`TaskScheduler`] bounds the number of simultaneously running tasks,
//! enforces a per-attempt timeout, and retries transient failures with
//! exponential backoff (`retry_base_delay_ms * 2^n` before retry `n + 1`).
//! A task that keeps failing ends `Failed` after `max_retries + 1` attempts.
//!
//! ```text
//! pending → running → completed
//!                   → failed
//!                   → cancelled
//!                   → pending (retry, after backoff)
//! pending → cancelled
//! ```

mod error;
mod handle;
mod scheduler;

pub use error::SchedulerError;
pub use handle::{TaskHandle, TaskOutcome, TaskReport};
pub use scheduler::TaskScheduler;
