//! Per-operation database handle.
//!
//! A `DatabaseHandle` is one exclusive SQLite connection, opened at the start
//! of an operation and closed before the operation returns. There is no pool:
//! every operation gets a fresh connection and nothing is shared between calls.

use crate::error::{DbError, DbResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use tracing::{debug, warn};

/// A single open connection to the configured database file.
///
/// Dropping the handle without calling [`DatabaseHandle::close`] still shuts the
/// connection's worker down, so an early return or a panic cannot leak it.
pub struct DatabaseHandle {
    conn: SqliteConnection,
}

impl DatabaseHandle {
    /// Open a connection to the file at `path`, creating the file if it does not exist.
    pub async fn open(path: &Path) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let conn = options.connect().await.map_err(|e| {
            DbError::connection(
                format!("Failed to open {}: {}", path.display(), e),
                "Verify the file path exists and is accessible",
            )
        })?;

        debug!(path = %path.display(), "Opened database handle");
        Ok(Self { conn })
    }

    /// Borrow the underlying connection as an executor.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Close the connection. Close failures are logged, not returned: the
    /// operation's own outcome is what the caller sees.
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "Failed to close database handle cleanly");
        }
    }
}
