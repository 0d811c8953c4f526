//! SQL statement construction.
//!
//! Identifiers (table and column names) cannot be bound as parameters, so they
//! are validated against a conservative character set and double-quoted before
//! being interpolated. Values are never interpolated: every builder emits
//! numbered `?NNN` placeholders in the order of the supplied values.
//!
//! Raw filter fragments are appended verbatim, parenthesized, as the WHERE body. Whether they
//! may be used at all is decided by the caller (see `RawSqlPolicy`).

use crate::db::value::ColumnValueMap;
use crate::error::{DbError, DbResult};

/// Longest identifier accepted.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Check that `name` is safe to interpolate as an identifier.
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*` up to `MAX_IDENTIFIER_LEN` characters.
pub fn validate_identifier(name: &str) -> DbResult<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    if !valid_start
        || name.len() > MAX_IDENTIFIER_LEN
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DbError::invalid_input(format!(
            "'{}' is not a valid identifier (letters, digits and underscores only, \
             starting with a letter or underscore, at most {} characters)",
            name, MAX_IDENTIFIER_LEN
        )));
    }
    Ok(name)
}

/// Validate and double-quote an identifier.
pub fn quote_identifier(name: &str) -> DbResult<String> {
    validate_identifier(name).map(|n| format!("\"{}\"", n))
}

/// Parenthesize a caller fragment on its own line so a trailing `--` comment
/// ends before LIMIT/OFFSET.
fn where_clause(conditions: &str) -> String {
    format!(" WHERE ({}\n)", conditions)
}

fn non_empty(values: &ColumnValueMap) -> DbResult<()> {
    if values.is_empty() {
        return Err(DbError::invalid_input(
            "columnValues must contain at least one column",
        ));
    }
    Ok(())
}

/// `INSERT INTO "t" ("a", "b") VALUES (?1, ?2)`
pub fn build_insert(table: &str, values: &ColumnValueMap) -> DbResult<String> {
    non_empty(values)?;
    let table = quote_identifier(table)?;
    let columns = values
        .columns()
        .map(quote_identifier)
        .collect::<DbResult<Vec<_>>>()?;
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    ))
}

/// `SELECT * FROM "t" [WHERE (<conditions>)] LIMIT ?1 OFFSET ?2`
pub fn build_select(table: &str, conditions: Option<&str>) -> DbResult<String> {
    let mut sql = format!("SELECT * FROM {}", quote_identifier(table)?);
    if let Some(conditions) = conditions {
        sql.push_str(&where_clause(conditions));
    }
    sql.push_str(" LIMIT ?1 OFFSET ?2");
    Ok(sql)
}

/// `UPDATE "t" SET "a" = ?1, "b" = ?2 WHERE (<conditions>)`
pub fn build_update(table: &str, values: &ColumnValueMap, conditions: &str) -> DbResult<String> {
    non_empty(values)?;
    let table = quote_identifier(table)?;
    let assignments = values
        .columns()
        .enumerate()
        .map(|(i, col)| quote_identifier(col).map(|c| format!("{} = ?{}", c, i + 1)))
        .collect::<DbResult<Vec<_>>>()?;

    Ok(format!(
        "UPDATE {} SET {}{}",
        table,
        assignments.join(", "),
        where_clause(conditions)
    ))
}

/// `DELETE FROM "t" WHERE (<conditions>)`
pub fn build_delete(table: &str, conditions: &str) -> DbResult<String> {
    Ok(format!(
        "DELETE FROM {}{}",
        quote_identifier(table)?,
        where_clause(conditions)
    ))
}

/// `PRAGMA table_info("t")`
pub fn build_table_info(table: &str) -> DbResult<String> {
    Ok(format!("PRAGMA table_info({})", quote_identifier(table)?))
}
