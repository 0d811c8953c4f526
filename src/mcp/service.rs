//! MCP service implementation using rmcp.
//!
//! This module defines the SqliteService struct with the eight database
//! tools exposed via the MCP protocol using the rmcp framework's macros.
//! Each tool returns the operation's text as a single text content block.

use crate::models::OperationOutcome;
use crate::tools::{
    CreateRecordInput, DatabaseOperationService, DeleteRecordsInput, GetTableSchemaInput,
    QueryInput, ReadRecordsInput, UpdateRecordsInput,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct SqliteService {
    /// Shared operation service; all sessions go through the same gate
    operations: Arc<DatabaseOperationService>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl SqliteService {
    pub fn new(operations: Arc<DatabaseOperationService>) -> Self {
        Self {
            operations,
            tool_router: Self::tool_router(),
        }
    }

    pub fn operations(&self) -> &DatabaseOperationService {
        &self.operations
    }
}

fn text_result(outcome: OperationOutcome) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        outcome.into_text(),
    )]))
}

#[tool_router]
impl SqliteService {
    #[tool(
        description = "Get information about the SQLite database.\nReturns the file path, whether it exists, its size and the number of tables."
    )]
    async fn db_info(&self) -> Result<CallToolResult, McpError> {
        text_result(self.operations.db_info().await)
    }

    #[tool(description = "List all tables in the database, one name per line.")]
    async fn list_tables(&self) -> Result<CallToolResult, McpError> {
        text_result(self.operations.list_tables().await)
    }

    #[tool(
        description = "Get the column definitions of a table.\nReturns ordinal, name, type, NOT NULL, default and primary-key flag for each column."
    )]
    async fn get_table_schema(
        &self,
        Parameters(input): Parameters<GetTableSchemaInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.operations.get_table_schema(input).await)
    }

    #[tool(
        description = "Insert a new record into a table.\ncolumnValues maps column names to values. Use {\"base64\": \"...\"} for binary data."
    )]
    async fn create_record(
        &self,
        Parameters(input): Parameters<CreateRecordInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.operations.create_record(input).await)
    }

    #[tool(
        description = "Read records from a table as a JSON array.\nOptional conditions (WHERE clause body), limit (default 100) and offset (default 0).\nConditions require the server to run with --allow-raw-sql."
    )]
    async fn read_records(
        &self,
        Parameters(input): Parameters<ReadRecordsInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.operations.read_records(input).await)
    }

    #[tool(
        description = "Update records matching conditions (WHERE clause body) with the given columnValues.\nRequires the server to run with --allow-raw-sql."
    )]
    async fn update_records(
        &self,
        Parameters(input): Parameters<UpdateRecordsInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.operations.update_records(input).await)
    }

    #[tool(
        description = "Delete records matching conditions (WHERE clause body).\nRequires the server to run with --allow-raw-sql."
    )]
    async fn delete_records(
        &self,
        Parameters(input): Parameters<DeleteRecordsInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.operations.delete_records(input).await)
    }

    #[tool(
        description = "Execute a SQL statement and return the number of affected rows.\nNamed parameters (:name, @name, $name) are bound from the parameters object.\nNo row data is returned; use read_records to fetch rows.\nRequires the server to run with --allow-raw-sql."
    )]
    async fn query(
        &self,
        Parameters(input): Parameters<QueryInput>,
    ) -> Result<CallToolResult, McpError> {
        text_result(self.operations.query(input).await)
    }
}

#[tool_handler]
impl ServerHandler for SqliteService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sqlite-mcp-server".to_owned(),
                title: Some("SQLite MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for inspecting and editing a single SQLite database file.\n\
                \n\
                ## Workflow\n\
                1. Call `list_tables` to see what the database contains\n\
                2. Call `get_table_schema` before writing to a table\n\
                3. Use `read_records` to fetch rows; `query` only reports affected rows\n\
                \n\
                ## Raw SQL\n\
                `conditions` and `query` pass SQL through verbatim and are refused\n\
                unless the server was started with `--allow-raw-sql`."
                    .to_string(),
            ),
        }
    }
}
