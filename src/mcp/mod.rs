//! MCP server integration module.
//!
//! Bridges the MCP protocol and `DatabaseOperationService` using rmcp.

pub mod service;

pub use service::SqliteService;
