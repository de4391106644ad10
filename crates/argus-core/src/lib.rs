//! # argus-core
//!
//! Core types, ID generation, and error types for Argus.
//!
//! This crate provides the foundational types shared across all Argus crates:
//! - Entity structs for runs, agent executions, tasks, findings and summaries
//! - Status enums with state machine transitions
//! - ID prefix constants and generation
//! - Cross-cutting error types, including the task error taxonomy
//! - Trail operation envelope for JSONL status trails
//! - The `StatusSink` / `RunStore` persistence seam and an in-memory store

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod store;
pub mod trail;
