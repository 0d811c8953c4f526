//! Statement execution.
//!
//! Thin wrappers over sqlx that bind `SqlValue`s, run a statement on an open
//! connection, and return either the affected-row count or decoded records.
//! No timeout or retry is applied: a long statement blocks until the engine
//! returns.

use crate::db::value::{RecordSet, SqlValue, bind_value, row_to_record};
use crate::error::DbResult;
use sqlx::sqlite::SqliteConnection;
use std::time::Instant;
use tracing::debug;

/// Execute one statement with bound values and return the affected-row count.
pub async fn execute(conn: &mut SqliteConnection, sql: &str, values: &[SqlValue]) -> DbResult<u64> {
    let start = Instant::now();
    debug!(sql = %sql, params = values.len(), "Executing statement");

    let mut query = sqlx::query(sql);
    for value in values {
        query = bind_value(query, value);
    }
    let result = query.execute(&mut *conn).await?;

    debug!(
        rows_affected = result.rows_affected(),
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Statement executed"
    );
    Ok(result.rows_affected())
}

/// Execute caller statement text and count the rows it changed.
///
/// The text may hold several `;`-separated statements. Without values it runs
/// unprepared. The count is the connection's `total_changes()` delta, so
/// statements that change nothing (SELECT, DDL) add nothing to it.
pub async fn execute_script(
    conn: &mut SqliteConnection,
    sql: &str,
    values: &[SqlValue],
) -> DbResult<u64> {
    use sqlx::Executor;

    let start = Instant::now();
    debug!(sql = %sql, params = values.len(), "Executing script");

    let before = total_changes(conn).await?;
    if values.is_empty() {
        (&mut *conn).execute(sql).await?;
    } else {
        let mut query = sqlx::query(sql);
        for value in values {
            query = bind_value(query, value);
        }
        query.execute(&mut *conn).await?;
    }
    let after = total_changes(conn).await?;
    let changed = u64::try_from(after - before).unwrap_or(0);

    debug!(
        rows_affected = changed,
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Script executed"
    );
    Ok(changed)
}

async fn total_changes(conn: &mut SqliteConnection) -> DbResult<i64> {
    let changes = sqlx::query_scalar::<_, i64>("SELECT total_changes()")
        .fetch_one(&mut *conn)
        .await?;
    Ok(changes)
}

/// Run a query with bound values and decode every row.
pub async fn fetch_records(
    conn: &mut SqliteConnection,
    sql: &str,
    values: &[SqlValue],
) -> DbResult<RecordSet> {
    let start = Instant::now();
    debug!(sql = %sql, params = values.len(), "Executing query");

    let mut query = sqlx::query(sql);
    for value in values {
        query = bind_value(query, value);
    }
    let rows = query.fetch_all(&mut *conn).await?;
    let records: RecordSet = rows.iter().map(row_to_record).collect();

    debug!(
        rows = records.len(),
        execution_time_ms = start.elapsed().as_millis() as u64,
        "Query executed"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseHandle;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_execute_and_fetch_preserve_types_and_order() {
        let dir = tempdir().unwrap();
        let mut handle = DatabaseHandle::open(&dir.path().join("t.db")).await.unwrap();

        execute_script(
            handle.conn(),
            "CREATE TABLE t (z TEXT, a INTEGER, r REAL, b BLOB, n TEXT)",
            &[],
        )
        .await
        .unwrap();

        let affected = execute(
            handle.conn(),
            "INSERT INTO t VALUES (?1, ?2, ?3, ?4, ?5)",
            &[
                SqlValue::Text("hi".to_string()),
                SqlValue::Integer(42),
                SqlValue::Real(2.5),
                SqlValue::Blob(vec![0xde, 0xad]),
                SqlValue::Null,
            ],
        )
        .await
        .unwrap();
        assert_eq!(affected, 1);

        let records = fetch_records(handle.conn(), "SELECT * FROM t", &[])
            .await
            .unwrap();
        handle.close().await;

        assert_eq!(records.len(), 1);
        let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "r", "b", "n"]);
        assert_eq!(
            serde_json::Value::Object(records[0].clone()),
            json!({ "z": "hi", "a": 42, "r": 2.5, "b": "3q0=", "n": null })
        );
    }

    #[tokio::test]
    async fn test_execute_script_runs_multiple_statements() {
        let dir = tempdir().unwrap();
        let mut handle = DatabaseHandle::open(&dir.path().join("t.db")).await.unwrap();

        let affected = execute_script(
            handle.conn(),
            "CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1); INSERT INTO t VALUES (2)",
            &[],
        )
        .await
        .unwrap();
        assert_eq!(affected, 2);

        let records = fetch_records(handle.conn(), "SELECT v FROM t", &[])
            .await
            .unwrap();
        handle.close().await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_execute_script_ignores_statements_that_change_nothing() {
        let dir = tempdir().unwrap();
        let mut handle = DatabaseHandle::open(&dir.path().join("t.db")).await.unwrap();
        execute_script(handle.conn(), "CREATE TABLE t (v INTEGER)", &[])
            .await
            .unwrap();

        let affected = execute_script(
            handle.conn(),
            "INSERT INTO t VALUES (1); SELECT * FROM t; SELECT 1",
            &[],
        )
        .await
        .unwrap();
        assert_eq!(affected, 1);

        let affected = execute_script(
            handle.conn(),
            "UPDATE t SET v = ?1",
            &[SqlValue::Integer(5)],
        )
        .await
        .unwrap();
        handle.close().await;
        assert_eq!(affected, 1);
    }
}
