//! Every operation reports a prefixed failure when the database cannot be opened.

use serde_json::json;
use sqlite_mcp_server::tools::{
    CreateRecordInput, DeleteRecordsInput, GetTableSchemaInput, QueryInput, ReadRecordsInput,
    UpdateRecordsInput,
};
use sqlite_mcp_server::{DatabaseOperationService, OperationOutcome, RawSqlPolicy};
use tempfile::TempDir;

#[tokio::test]
async fn test_all_operations_fail_with_error_prefix() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("nested").join("db.sqlite");
    let service = DatabaseOperationService::new(&path, RawSqlPolicy::Allow);
    let values = json!({ "name": "x" }).as_object().unwrap().clone();

    let outcomes: Vec<(&str, OperationOutcome)> = vec![
        ("Error retrieving database info: ", service.db_info().await),
        ("Error listing tables: ", service.list_tables().await),
        (
            "Error retrieving schema for table 'users': ",
            service
                .get_table_schema(GetTableSchemaInput {
                    table_name: "users".to_string(),
                })
                .await,
        ),
        (
            "Error creating record in table 'users': ",
            service
                .create_record(CreateRecordInput {
                    table_name: "users".to_string(),
                    column_values: values.clone(),
                })
                .await,
        ),
        (
            "Error reading records from table 'users': ",
            service
                .read_records(ReadRecordsInput {
                    table_name: "users".to_string(),
                    conditions: None,
                    limit: 100,
                    offset: 0,
                })
                .await,
        ),
        (
            "Error updating records in table 'users': ",
            service
                .update_records(UpdateRecordsInput {
                    table_name: "users".to_string(),
                    column_values: values.clone(),
                    conditions: "id = 1".to_string(),
                })
                .await,
        ),
        (
            "Error deleting records from table 'users': ",
            service
                .delete_records(DeleteRecordsInput {
                    table_name: "users".to_string(),
                    conditions: "id = 1".to_string(),
                })
                .await,
        ),
        (
            "Error executing query: ",
            service
                .query(QueryInput {
                    sql_query: "SELECT 1".to_string(),
                    parameters: None,
                })
                .await,
        ),
    ];

    for (prefix, outcome) in outcomes {
        assert!(outcome.is_failure(), "{}: {:?}", prefix, outcome);
        let text = outcome.into_text();
        assert!(text.starts_with(prefix), "expected '{}' in '{}'", prefix, text);
        assert!(text.len() > prefix.len());
    }

    assert!(!path.exists());
}
