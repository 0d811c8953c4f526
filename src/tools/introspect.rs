//! Introspection operations.
//!
//! This module implements `db_info`, `list_tables` and `get_table_schema`.

use crate::db::SchemaInspector;
use crate::db::statement::validate_identifier;
use crate::error::DbResult;
use crate::models::{DatabaseInfo, OperationOutcome};
use crate::tools::DatabaseOperationService;
use schemars::JsonSchema;
use serde::Deserialize;
use std::io::ErrorKind;

pub const NO_TABLES_MESSAGE: &str = "No tables found in the database.";

/// Input for the get_table_schema tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetTableSchemaInput {
    /// Name of the table to describe
    pub table_name: String,
}

impl DatabaseOperationService {
    /// File path, existence, size and table count of the database.
    pub async fn db_info(&self) -> OperationOutcome {
        self.run("db_info", "Error retrieving database info", self.try_db_info())
            .await
    }

    async fn try_db_info(&self) -> DbResult<OperationOutcome> {
        let (exists, size_bytes) = match tokio::fs::metadata(self.db_path()).await {
            Ok(meta) => (true, meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => (false, 0),
            Err(e) => return Err(e.into()),
        };

        let mut handle = self.open().await?;
        let table_count = SchemaInspector::count_tables(handle.conn()).await;
        handle.close().await;

        let info = DatabaseInfo {
            path: self.db_path().to_path_buf(),
            exists,
            size_bytes,
            table_count: table_count?,
        };
        Ok(OperationOutcome::message(info.to_string()))
    }

    /// Newline-separated user table names in catalog order.
    pub async fn list_tables(&self) -> OperationOutcome {
        self.run("list_tables", "Error listing tables", self.try_list_tables())
            .await
    }

    async fn try_list_tables(&self) -> DbResult<OperationOutcome> {
        let mut handle = self.open().await?;
        let names = SchemaInspector::list_tables(handle.conn()).await;
        handle.close().await;

        let names = names?;
        if names.is_empty() {
            return Ok(OperationOutcome::message(NO_TABLES_MESSAGE));
        }
        Ok(OperationOutcome::message(names.join("\n")))
    }

    /// Column listing for one table.
    pub async fn get_table_schema(&self, input: GetTableSchemaInput) -> OperationOutcome {
        let context = format!(
            "Error retrieving schema for table '{}'",
            input.table_name
        );
        self.run(
            "get_table_schema",
            &context,
            self.try_get_table_schema(&input.table_name),
        )
        .await
    }

    async fn try_get_table_schema(&self, table_name: &str) -> DbResult<OperationOutcome> {
        validate_identifier(table_name)?;

        let mut handle = self.open().await?;
        let schema = SchemaInspector::describe_table(handle.conn(), table_name).await;
        handle.close().await;

        let schema = schema?;
        if schema.columns.is_empty() {
            return Ok(OperationOutcome::message(format!(
                "Table '{}' does not exist.",
                table_name
            )));
        }
        Ok(OperationOutcome::message(schema.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_table_schema_input_uses_camel_case() {
        let input: GetTableSchemaInput =
            serde_json::from_str(r#"{ "tableName": "users" }"#).unwrap();
        assert_eq!(input.table_name, "users");
    }

    #[test]
    fn test_get_table_schema_input_requires_table_name() {
        assert!(serde_json::from_str::<GetTableSchemaInput>("{}").is_err());
    }
}
