//! SQLite MCP Server Library
//!
//! This library exposes a single SQLite database file to MCP (Model Context
//! Protocol) clients: introspection, record CRUD and raw SQL execution.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::SqliteService;
pub use models::OperationOutcome;
pub use tools::{DatabaseOperationService, RawSqlPolicy};
