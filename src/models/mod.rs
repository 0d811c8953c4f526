//! Data models for the SQLite MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod outcome;
pub mod schema;

// Re-export commonly used types
pub use outcome::OperationOutcome;
pub use schema::{ColumnSchema, DatabaseInfo, TableSchema};
