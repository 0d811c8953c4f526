//! Database access layer.
//!
//! This module provides SQLite access functionality:
//! - Per-operation connection handles
//! - Statement construction with identifier validation
//! - Named parameter binding for raw queries
//! - Statement execution and row decoding
//! - Schema introspection

pub mod executor;
pub mod handle;
pub mod params;
pub mod schema;
pub mod statement;
pub mod value;

pub use handle::DatabaseHandle;
pub use params::{BoundStatement, bind_named};
pub use schema::SchemaInspector;
pub use value::{ColumnValueMap, Record, RecordSet, SqlValue};
