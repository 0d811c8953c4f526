//! Database operations.
//!
//! `DatabaseOperationService` exposes the operation catalogue:
//! - `db_info`, `list_tables`, `get_table_schema`: introspection
//! - `create_record`, `read_records`, `update_records`, `delete_records`: record CRUD
//! - `query`: raw SQL with optional named parameters

pub mod introspect;
pub mod query;
pub mod records;
pub mod service;

pub use introspect::GetTableSchemaInput;
pub use query::QueryInput;
pub use records::{CreateRecordInput, DeleteRecordsInput, ReadRecordsInput, UpdateRecordsInput};
pub use service::{DatabaseOperationService, RawSqlPolicy};
