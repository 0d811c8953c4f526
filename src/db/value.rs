//! Scalar values, column/value maps and row decoding.
//!
//! # Architecture
//!
//! SQLite is dynamically typed, so decoding follows the storage class of each
//! value at runtime rather than the column's declared type:
//! 1. `StorageClass` classifies the value's runtime type
//! 2. A per-class decoder extracts it into JSON
//!
//! Input values arrive as JSON and are converted to `SqlValue` before binding.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

/// One result row: column name to value, in result-set column order.
pub type Record = serde_json::Map<String, JsonValue>;

/// Ordered rows of a read operation.
pub type RecordSet = Vec<Record>;

/// Key for passing binary data in JSON input: `{"base64": "..."}`.
pub const BLOB_KEY: &str = "base64";

/// A scalar SQLite value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Convert a JSON input value.
    ///
    /// Booleans become 0/1, `{"base64": "..."}` becomes a blob when the
    /// payload decodes, and any other array or object is stored as its JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Integer(i64::from(*b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map(Self::Real).unwrap_or(Self::Text(n.to_string())),
            },
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Object(obj) => match blob_payload(obj) {
                Some(bytes) => Self::Blob(bytes),
                None => Self::Text(value.to_string()),
            },
            JsonValue::Array(_) => Self::Text(value.to_string()),
        }
    }

    /// Render as JSON. Blobs become base64 strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Integer(v) => JsonValue::Number((*v).into()),
            Self::Real(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(v.to_string())),
            Self::Text(v) => JsonValue::String(v.clone()),
            Self::Blob(v) => JsonValue::String(STANDARD.encode(v)),
        }
    }
}

fn blob_payload(obj: &serde_json::Map<String, JsonValue>) -> Option<Vec<u8>> {
    if obj.len() != 1 {
        return None;
    }
    obj.get(BLOB_KEY)
        .and_then(JsonValue::as_str)
        .and_then(|s| STANDARD.decode(s).ok())
}

/// Ordered mapping from column name to value, used as create/update input.
///
/// Column names are unique: the map is built from a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValueMap {
    entries: Vec<(String, SqlValue)>,
}

impl ColumnValueMap {
    pub fn from_json(map: &serde_json::Map<String, JsonValue>) -> Self {
        Self {
            entries: map
                .iter()
                .map(|(k, v)| (k.clone(), SqlValue::from_json(v)))
                .collect(),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bind a value to a SQLite query.
pub(crate) fn bind_value<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q SqlValue,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Integer(v) => query.bind(*v),
        SqlValue::Real(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.as_str()),
        SqlValue::Blob(v) => query.bind(v.as_slice()),
    }
}

// =============================================================================
// Row Decoding
// =============================================================================

/// Runtime storage class of a SQLite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl StorageClass {
    /// Classify the runtime type name of a value (`NULL`, `INTEGER`, `REAL`,
    /// `TEXT` or `BLOB`).
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "NULL" => Self::Null,
            "INTEGER" => Self::Integer,
            "REAL" => Self::Real,
            "BLOB" => Self::Blob,
            _ => Self::Text,
        }
    }
}

/// Convert a row into a record, keeping the result-set column order.
pub fn row_to_record(row: &SqliteRow) -> Record {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| (col.name().to_string(), decode_column(row, idx)))
        .collect()
}

fn decode_column(row: &SqliteRow, idx: usize) -> JsonValue {
    let class = match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => StorageClass::Null,
        Ok(raw) => StorageClass::from_type_name(raw.type_info().name()),
        Err(_) => return JsonValue::Null,
    };

    match class {
        StorageClass::Null => JsonValue::Null,
        StorageClass::Integer => decode_integer(row, idx),
        StorageClass::Real => decode_real(row, idx),
        StorageClass::Blob => decode_blob(row, idx),
        StorageClass::Text => decode_text(row, idx),
    }
}

fn decode_integer(row: &SqliteRow, idx: usize) -> JsonValue {
    match row.try_get::<i64, _>(idx) {
        Ok(v) => SqlValue::Integer(v).to_json(),
        Err(_) => decode_text(row, idx),
    }
}

fn decode_real(row: &SqliteRow, idx: usize) -> JsonValue {
    match row.try_get::<f64, _>(idx) {
        Ok(v) => SqlValue::Real(v).to_json(),
        Err(_) => decode_text(row, idx),
    }
}

fn decode_blob(row: &SqliteRow, idx: usize) -> JsonValue {
    row.try_get::<Vec<u8>, _>(idx)
        .map(|v| SqlValue::Blob(v).to_json())
        .unwrap_or(JsonValue::Null)
}

fn decode_text(row: &SqliteRow, idx: usize) -> JsonValue {
    row.try_get::<String, _>(idx)
        .map(JsonValue::String)
        .unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(SqlValue::from_json(&json!(null)), SqlValue::Null);
        assert_eq!(SqlValue::from_json(&json!(7)), SqlValue::Integer(7));
        assert_eq!(SqlValue::from_json(&json!(1.5)), SqlValue::Real(1.5));
        assert_eq!(SqlValue::from_json(&json!(true)), SqlValue::Integer(1));
        assert_eq!(
            SqlValue::from_json(&json!("x")),
            SqlValue::Text("x".to_string())
        );
    }

    #[test]
    fn test_from_json_blob_object() {
        let value = SqlValue::from_json(&json!({ "base64": "AAEC" }));
        assert_eq!(value, SqlValue::Blob(vec![0, 1, 2]));
        assert_eq!(value.to_json(), json!("AAEC"));
    }

    #[test]
    fn test_from_json_other_objects_become_text() {
        let value = SqlValue::from_json(&json!({ "a": 1 }));
        assert_eq!(value, SqlValue::Text(r#"{"a":1}"#.to_string()));

        // Not valid base64: kept as JSON text
        let value = SqlValue::from_json(&json!({ "base64": "***" }));
        assert_eq!(value, SqlValue::Text(r#"{"base64":"***"}"#.to_string()));

        let value = SqlValue::from_json(&json!([1, 2]));
        assert_eq!(value, SqlValue::Text("[1,2]".to_string()));
    }

    #[test]
    fn test_real_non_finite_renders_as_string() {
        assert_eq!(SqlValue::Real(f64::NAN).to_json(), json!("NaN"));
    }

    #[test]
    fn test_column_value_map_keeps_insertion_order() {
        let input = json!({ "zeta": 1, "alpha": "a", "mid": null });
        let map = ColumnValueMap::from_json(input.as_object().unwrap());
        assert_eq!(map.columns().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
        assert_eq!(map.values().nth(2), Some(&SqlValue::Null));
    }

    #[test]
    fn test_storage_class_from_type_name() {
        assert_eq!(StorageClass::from_type_name("INTEGER"), StorageClass::Integer);
        assert_eq!(StorageClass::from_type_name("REAL"), StorageClass::Real);
        assert_eq!(StorageClass::from_type_name("BLOB"), StorageClass::Blob);
        assert_eq!(StorageClass::from_type_name("NULL"), StorageClass::Null);
        assert_eq!(StorageClass::from_type_name("TEXT"), StorageClass::Text);
    }
}
