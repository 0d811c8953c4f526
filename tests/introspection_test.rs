//! db_info, list_tables and get_table_schema.

use sqlite_mcp_server::tools::{GetTableSchemaInput, QueryInput};
use sqlite_mcp_server::{DatabaseOperationService, RawSqlPolicy};
use tempfile::TempDir;

fn service(dir: &TempDir) -> DatabaseOperationService {
    DatabaseOperationService::new(dir.path().join("test.db"), RawSqlPolicy::Allow)
}

async fn exec(service: &DatabaseOperationService, sql: &str) {
    let outcome = service
        .query(QueryInput {
            sql_query: sql.to_string(),
            parameters: None,
        })
        .await;
    assert!(!outcome.is_failure(), "{:?}", outcome);
}

fn schema_input(table: &str) -> GetTableSchemaInput {
    GetTableSchemaInput {
        table_name: table.to_string(),
    }
}

#[tokio::test]
async fn test_list_tables_on_empty_database() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    assert_eq!(
        service.list_tables().await.into_text(),
        "No tables found in the database."
    );
}

#[tokio::test]
async fn test_list_tables_in_creation_order() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    exec(&service, "CREATE TABLE b (x INTEGER)").await;
    exec(&service, "CREATE TABLE a (x INTEGER)").await;

    assert_eq!(service.list_tables().await.into_text(), "b\na");
}

#[tokio::test]
async fn test_list_tables_hides_internal_tables() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    // AUTOINCREMENT creates sqlite_sequence
    exec(
        &service,
        "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT); INSERT INTO t DEFAULT VALUES",
    )
    .await;

    assert_eq!(service.list_tables().await.into_text(), "t");
}

#[tokio::test]
async fn test_schema_of_missing_table() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    assert_eq!(
        service
            .get_table_schema(schema_input("nonexistent"))
            .await
            .into_text(),
        "Table 'nonexistent' does not exist."
    );
}

#[tokio::test]
async fn test_schema_lists_columns() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    exec(
        &service,
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER DEFAULT 0)",
    )
    .await;

    let text = service.get_table_schema(schema_input("users")).await.into_text();
    assert_eq!(
        text,
        "Schema for table 'users':\n\
         \x20 0: id INTEGER | not null: false | default: NULL | primary key: true\n\
         \x20 1: name TEXT | not null: true | default: NULL | primary key: false\n\
         \x20 2: age INTEGER | not null: false | default: 0 | primary key: false"
    );
}

#[tokio::test]
async fn test_schema_rejects_unsafe_table_name() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);
    let text = service
        .get_table_schema(schema_input("users\"); DROP TABLE x; --"))
        .await
        .into_text();
    assert!(text.starts_with("Error retrieving schema for table 'users\"); DROP TABLE x; --': "));
}

#[tokio::test]
async fn test_db_info_reports_file_and_tables() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir);

    let text = service.db_info().await.into_text();
    assert!(text.starts_with("Database path: "), "{}", text);
    assert!(text.contains("Exists: false"), "{}", text);
    assert!(text.contains("Size: 0 bytes"), "{}", text);
    assert!(text.ends_with("Tables: 0"), "{}", text);

    exec(&service, "CREATE TABLE a (x INTEGER); CREATE TABLE b (y TEXT)").await;

    let text = service.db_info().await.into_text();
    assert!(text.contains("Exists: true"), "{}", text);
    assert!(!text.contains("Size: 0 bytes"), "{}", text);
    assert!(text.ends_with("Tables: 2"), "{}", text);
}
