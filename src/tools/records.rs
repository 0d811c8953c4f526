//! Record CRUD operations.
//!
//! This module implements `create_record`, `read_records`, `update_records`
//! and `delete_records`. Table and column names are validated and quoted;
//! values are always bound. The `conditions` fragment is used verbatim as the
//! WHERE body and therefore requires `RawSqlPolicy::Allow`.

use crate::db::statement::{build_delete, build_insert, build_select, build_update};
use crate::db::{ColumnValueMap, SqlValue, executor};
use crate::error::{DbError, DbResult};
use crate::models::OperationOutcome;
use crate::tools::DatabaseOperationService;
use crate::tools::service::non_blank;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

/// Default page size for read_records.
pub const DEFAULT_READ_LIMIT: i64 = 100;

fn default_limit() -> i64 {
    DEFAULT_READ_LIMIT
}

/// Input for the create_record tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordInput {
    /// Table to insert into
    pub table_name: String,
    /// Column name to value. Use {"base64": "..."} for binary values.
    pub column_values: serde_json::Map<String, JsonValue>,
}

/// Input for the read_records tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadRecordsInput {
    /// Table to read from
    pub table_name: String,
    /// Optional WHERE clause body, used verbatim (e.g. "age > 30")
    #[serde(default)]
    pub conditions: Option<String>,
    /// Maximum number of records to return. Default: 100
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of records to skip. Default: 0
    #[serde(default)]
    pub offset: i64,
}

/// Input for the update_records tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordsInput {
    /// Table to update
    pub table_name: String,
    /// Column name to new value
    pub column_values: serde_json::Map<String, JsonValue>,
    /// WHERE clause body selecting the rows to update, used verbatim
    pub conditions: String,
}

/// Input for the delete_records tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecordsInput {
    /// Table to delete from
    pub table_name: String,
    /// WHERE clause body selecting the rows to delete, used verbatim
    pub conditions: String,
}

fn required_conditions(conditions: &str) -> DbResult<&str> {
    non_blank(Some(conditions)).ok_or_else(|| {
        DbError::invalid_input("conditions are required and must not be empty")
    })
}

impl DatabaseOperationService {
    /// Insert one row built from the supplied columns.
    pub async fn create_record(&self, input: CreateRecordInput) -> OperationOutcome {
        let context = format!("Error creating record in table '{}'", input.table_name);
        self.run("create_record", &context, self.try_create_record(&input))
            .await
    }

    async fn try_create_record(&self, input: &CreateRecordInput) -> DbResult<OperationOutcome> {
        let values = ColumnValueMap::from_json(&input.column_values);
        let sql = build_insert(&input.table_name, &values)?;
        let params: Vec<SqlValue> = values.values().cloned().collect();

        let mut handle = self.open().await?;
        let result = executor::execute(handle.conn(), &sql, &params).await;
        handle.close().await;

        let rows_affected = result?;
        info!(
            table = %input.table_name,
            rows_affected,
            "Record created"
        );

        if rows_affected > 0 {
            Ok(OperationOutcome::message(format!(
                "Record created successfully in table '{}'.",
                input.table_name
            )))
        } else {
            Ok(OperationOutcome::message(format!(
                "Failed to create record in table '{}'.",
                input.table_name
            )))
        }
    }

    /// Page through a table's rows, optionally filtered.
    pub async fn read_records(&self, input: ReadRecordsInput) -> OperationOutcome {
        let context = format!("Error reading records from table '{}'", input.table_name);
        self.run("read_records", &context, self.try_read_records(&input))
            .await
    }

    async fn try_read_records(&self, input: &ReadRecordsInput) -> DbResult<OperationOutcome> {
        if input.limit < 0 || input.offset < 0 {
            return Err(DbError::invalid_input(
                "limit and offset must be zero or greater",
            ));
        }

        let conditions = non_blank(input.conditions.as_deref());
        if conditions.is_some() {
            self.require_raw_sql("conditions")?;
        }
        let sql = build_select(&input.table_name, conditions)?;
        let params = [SqlValue::Integer(input.limit), SqlValue::Integer(input.offset)];

        let mut handle = self.open().await?;
        let result = executor::fetch_records(handle.conn(), &sql, &params).await;
        handle.close().await;

        Ok(OperationOutcome::Records(result?))
    }

    /// Set the supplied columns on every row matching `conditions`.
    pub async fn update_records(&self, input: UpdateRecordsInput) -> OperationOutcome {
        let context = format!("Error updating records in table '{}'", input.table_name);
        self.run("update_records", &context, self.try_update_records(&input))
            .await
    }

    async fn try_update_records(&self, input: &UpdateRecordsInput) -> DbResult<OperationOutcome> {
        let conditions = required_conditions(&input.conditions)?;
        self.require_raw_sql("conditions")?;

        let values = ColumnValueMap::from_json(&input.column_values);
        let sql = build_update(&input.table_name, &values, conditions)?;
        let params: Vec<SqlValue> = values.values().cloned().collect();

        let mut handle = self.open().await?;
        let result = executor::execute(handle.conn(), &sql, &params).await;
        handle.close().await;

        let rows_affected = result?;
        info!(
            table = %input.table_name,
            rows_affected,
            "Records updated"
        );

        if rows_affected == 0 {
            return Ok(OperationOutcome::message(format!(
                "No records updated in table '{}'.",
                input.table_name
            )));
        }
        Ok(OperationOutcome::message(format!(
            "Updated {} record(s) in table '{}'.",
            rows_affected, input.table_name
        )))
    }

    /// Delete every row matching `conditions`.
    pub async fn delete_records(&self, input: DeleteRecordsInput) -> OperationOutcome {
        let context = format!("Error deleting records from table '{}'", input.table_name);
        self.run("delete_records", &context, self.try_delete_records(&input))
            .await
    }

    async fn try_delete_records(&self, input: &DeleteRecordsInput) -> DbResult<OperationOutcome> {
        let conditions = required_conditions(&input.conditions)?;
        self.require_raw_sql("conditions")?;

        let sql = build_delete(&input.table_name, conditions)?;

        let mut handle = self.open().await?;
        let result = executor::execute(handle.conn(), &sql, &[]).await;
        handle.close().await;

        let rows_affected = result?;
        info!(
            table = %input.table_name,
            rows_affected,
            "Records deleted"
        );

        if rows_affected == 0 {
            return Ok(OperationOutcome::message(format!(
                "No records deleted from table '{}'.",
                input.table_name
            )));
        }
        Ok(OperationOutcome::message(format!(
            "Deleted {} record(s) from table '{}'.",
            rows_affected, input.table_name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records_input_defaults() {
        let input: ReadRecordsInput = serde_json::from_str(r#"{ "tableName": "users" }"#).unwrap();
        assert_eq!(input.limit, DEFAULT_READ_LIMIT);
        assert_eq!(input.offset, 0);
        assert!(input.conditions.is_none());
    }

    #[test]
    fn test_create_record_input_keeps_column_order() {
        let input: CreateRecordInput = serde_json::from_str(
            r#"{ "tableName": "users", "columnValues": { "name": "x", "id": 1 } }"#,
        )
        .unwrap();
        let columns: Vec<&String> = input.column_values.keys().collect();
        assert_eq!(columns, ["name", "id"]);
    }

    #[test]
    fn test_update_records_input_requires_conditions() {
        let json = r#"{ "tableName": "users", "columnValues": { "name": "x" } }"#;
        assert!(serde_json::from_str::<UpdateRecordsInput>(json).is_err());
    }

    #[test]
    fn test_required_conditions() {
        assert!(required_conditions("  ").is_err());
        assert_eq!(required_conditions(" id = 1").unwrap(), "id = 1");
    }
}
