//! Retry for lock contention on the database file.
//!
//! The CLI can poll a run's status while another process is writing it, so a
//! write may briefly see `SQLITE_BUSY`. Those errors are retried with capped
//! exponential backoff; anything else is returned immediately.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Configuration for retry behavior on lock contention.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
        }
    }
}

/// Detect lock contention errors.
///
/// Kept narrow so genuine SQL and constraint errors are never retried.
pub fn is_busy_error(e: &libsql::Error) -> bool {
    let msg = e.to_string().to_ascii_lowercase();
    msg.contains("database is locked") || msg.contains("database table is locked")
}

/// Run `op` until it succeeds, fails with a non-busy error, or attempts run out.
///
/// # Errors
///
/// Returns the last error from `op`.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, libsql::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, libsql::Error>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if is_busy_error(&e) && attempt < config.max_attempts => {
                debug!(attempt, ?delay, error = %e, "database busy, retrying");
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, config.max_delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}
