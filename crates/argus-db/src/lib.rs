//! # argus-db
//!
//! libSQL persistence for Argus run state.
//!
//! Holds analysis runs, agent executions, agent tasks and the merged results
//! of each run. [`ArgusStore`] implements the `RunStore` seam the worker and
//! scheduler write through, and mirrors every transition into a per-run JSONL
//! trail.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) with a local database
//! file, or `:memory:` for tests.

pub mod error;
pub mod helpers;
mod migrations;
mod repos;
pub mod retry;
mod store;
pub mod trail;

use error::DatabaseError;
use libsql::Builder;

pub use store::ArgusStore;

/// Database handle: a libSQL database and its connection.
pub struct ArgusDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ArgusDb {
    /// Open a local database at the given path.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let argus_db = Self { db, conn };
        argus_db.run_migrations().await?;
        Ok(argus_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
