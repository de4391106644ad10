//! Per-run JSONL status trail.
//!
//! Every recorded transition is appended to `trail/{run_id}.jsonl` so a run
//! can be followed with nothing more than `tail -f`.

pub mod reader;
pub mod writer;
