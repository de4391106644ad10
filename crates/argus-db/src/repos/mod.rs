//! Table-level operations on `ArgusStore`, one module per table.

mod execution;
mod results;
mod run;
mod task;
