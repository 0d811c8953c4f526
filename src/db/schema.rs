//! Schema introspection against the SQLite catalog.

use crate::db::statement::build_table_info;
use crate::error::DbResult;
use crate::models::{ColumnSchema, TableSchema};
use sqlx::Row;
use sqlx::sqlite::SqliteConnection;
use tracing::debug;

/// Catalog queries.
mod queries {
    /// Every catalog entry of type table, internal tables included.
    pub const COUNT_TABLES: &str = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'";

    /// User tables in catalog order.
    pub const LIST_TABLES: &str = r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
    "#;
}

/// Schema inspector for the SQLite catalog.
pub struct SchemaInspector;

impl SchemaInspector {
    /// Count the tables recorded in the catalog.
    pub async fn count_tables(conn: &mut SqliteConnection) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(queries::COUNT_TABLES)
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// List user table names, excluding the engine's reserved `sqlite_` tables.
    pub async fn list_tables(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(queries::LIST_TABLES)
            .fetch_all(&mut *conn)
            .await?;
        debug!(count = names.len(), "Listed SQLite tables");
        Ok(names)
    }

    /// Describe a table's columns. A table that does not exist yields no columns.
    pub async fn describe_table(
        conn: &mut SqliteConnection,
        table_name: &str,
    ) -> DbResult<TableSchema> {
        let pragma = build_table_info(table_name)?;
        let rows = sqlx::query(&pragma).fetch_all(&mut *conn).await?;

        let columns = rows
            .iter()
            .map(|row| {
                let ordinal: i64 = row.try_get("cid")?;
                let name: String = row.try_get("name")?;
                let declared_type: String = row.try_get("type")?;
                let not_null: i64 = row.try_get("notnull")?;
                let default_value: Option<String> = row.try_get("dflt_value")?;
                let pk: i64 = row.try_get("pk")?;

                Ok(ColumnSchema::new(ordinal, name, declared_type)
                    .with_not_null(not_null != 0)
                    .with_default(default_value)
                    .with_primary_key(pk > 0))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        debug!(table = table_name, columns = columns.len(), "Described table");
        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns,
        })
    }
}
