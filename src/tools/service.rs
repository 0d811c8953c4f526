//! The database operation service.
//!
//! `DatabaseOperationService` owns the database path and runs the fixed
//! catalogue of operations. Every operation follows the same skeleton:
//! take the operation gate, open a fresh handle, execute, close the handle,
//! and fold the result into an `OperationOutcome`. Errors never escape as
//! `Err`; they become failure text prefixed with the operation's context.

use crate::db::DatabaseHandle;
use crate::error::{DbError, DbResult};
use crate::models::OperationOutcome;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;

/// Whether caller-supplied SQL text may be passed through verbatim.
///
/// Covers the `conditions` fragment of read/update/delete and the raw `query`
/// operation. Identifiers and bound values are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawSqlPolicy {
    #[default]
    Deny,
    Allow,
}

pub struct DatabaseOperationService {
    db_path: PathBuf,
    raw_sql: RawSqlPolicy,
    /// Serializes operations. Each one still gets its own connection; the
    /// gate keeps at most one operation touching the file at a time when the
    /// transport dispatches calls concurrently.
    gate: Mutex<()>,
}

impl DatabaseOperationService {
    pub fn new(db_path: impl Into<PathBuf>, raw_sql: RawSqlPolicy) -> Self {
        Self {
            db_path: db_path.into(),
            raw_sql,
            gate: Mutex::new(()),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn raw_sql_policy(&self) -> RawSqlPolicy {
        self.raw_sql
    }

    pub(crate) async fn open(&self) -> DbResult<DatabaseHandle> {
        DatabaseHandle::open(&self.db_path).await
    }

    /// Refuse verbatim SQL unless the service was built with `RawSqlPolicy::Allow`.
    pub(crate) fn require_raw_sql(&self, what: &str) -> DbResult<()> {
        match self.raw_sql {
            RawSqlPolicy::Allow => Ok(()),
            RawSqlPolicy::Deny => Err(DbError::permission(
                what,
                "raw SQL is disabled; start the server with --allow-raw-sql to enable it",
            )),
        }
    }

    /// Run one operation under the gate and settle its result.
    pub(crate) async fn run<F>(
        &self,
        operation: &'static str,
        context: &str,
        body: F,
    ) -> OperationOutcome
    where
        F: Future<Output = DbResult<OperationOutcome>>,
    {
        let _guard = self.gate.lock().await;
        match body.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(operation, error = %e, "Operation failed");
                OperationOutcome::failure(context, &e)
            }
        }
    }
}

/// Treat a blank fragment as absent.
pub(crate) fn non_blank(fragment: Option<&str>) -> Option<&str> {
    fragment.map(str::trim).filter(|s| !s.is_empty())
}
