//! Raw SQL execution.
//!
//! The `query` operation runs caller-supplied SQL and reports the number of
//! rows it changed. Named parameters (`:name`, `@name`, `$name`) are rewritten
//! to positional slots and bound from the `parameters` object. Several
//! `;`-separated statements may be sent at once; only INSERT, UPDATE and
//! DELETE contribute to the count.

use crate::db::{BoundStatement, bind_named, executor};
use crate::error::{DbError, DbResult};
use crate::models::OperationOutcome;
use crate::tools::DatabaseOperationService;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::info;

/// Input for the query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryInput {
    /// SQL statement(s) to execute
    pub sql_query: String,
    /// Optional named parameter values, e.g. {"id": 1} for ":id"
    #[serde(default)]
    pub parameters: Option<serde_json::Map<String, JsonValue>>,
}

impl DatabaseOperationService {
    /// Execute arbitrary SQL and report the affected-row count.
    pub async fn query(&self, input: QueryInput) -> OperationOutcome {
        self.run("query", "Error executing query", self.try_query(&input))
            .await
    }

    async fn try_query(&self, input: &QueryInput) -> DbResult<OperationOutcome> {
        self.require_raw_sql("query")?;

        let sql = input.sql_query.trim();
        if sql.is_empty() {
            return Err(DbError::invalid_input("sqlQuery must not be empty"));
        }

        // An empty map is the same as no map: the text runs as written
        let bound = match input.parameters.as_ref().filter(|p| !p.is_empty()) {
            Some(params) => bind_named(sql, params)?,
            None => BoundStatement {
                sql: sql.to_string(),
                values: Vec::new(),
            },
        };

        let mut handle = self.open().await?;
        let result = executor::execute_script(handle.conn(), &bound.sql, &bound.values).await;
        handle.close().await;

        let rows_affected = result?;
        info!(rows_affected, "Query executed");

        Ok(OperationOutcome::message(format!(
            "Query executed successfully. Rows affected: {}",
            rows_affected
        )))
    }
}
