//! Schema-related data models.
//!
//! This module defines types for database and table introspection.

use std::fmt;
use std::path::PathBuf;

/// One column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Position in declaration order, starting at 0
    pub ordinal: i64,
    pub name: String,
    /// Type as written in the CREATE TABLE statement; may be empty
    pub declared_type: String,
    pub not_null: bool,
    /// Default expression text, if any
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

impl ColumnSchema {
    /// Create a new column schema.
    pub fn new(ordinal: i64, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            declared_type: declared_type.into(),
            not_null: false,
            default_value: None,
            is_primary_key: false,
        }
    }

    /// Set the NOT NULL flag.
    pub fn with_not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// Set the default value expression.
    pub fn with_default(mut self, default_value: Option<String>) -> Self {
        self.default_value = default_value;
        self
    }

    /// Set whether this column is part of the primary key.
    pub fn with_primary_key(mut self, is_pk: bool) -> Self {
        self.is_primary_key = is_pk;
        self
    }
}

impl fmt::Display for ColumnSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  {}: {} {} | not null: {} | default: {} | primary key: {}",
            self.ordinal,
            self.name,
            self.declared_type,
            self.not_null,
            self.default_value.as_deref().unwrap_or("NULL"),
            self.is_primary_key
        )
    }
}

/// Columns of one table, in declaration order.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema for table '{}':", self.table_name)?;
        for column in &self.columns {
            write!(f, "\n{}", column)?;
        }
        Ok(())
    }
}

/// File and catalog facts about the configured database.
#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: u64,
    pub table_count: i64,
}

impl fmt::Display for DatabaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Database path: {}", self.path.display())?;
        writeln!(f, "Exists: {}", self.exists)?;
        writeln!(
            f,
            "Size: {} bytes ({})",
            self.size_bytes,
            humansize::format_size(self.size_bytes, humansize::WINDOWS)
        )?;
        write!(f, "Tables: {}", self.table_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_display_uses_null_for_missing_default() {
        let col = ColumnSchema::new(0, "id", "INTEGER")
            .with_not_null(true)
            .with_primary_key(true);
        assert_eq!(
            col.to_string(),
            "  0: id INTEGER | not null: true | default: NULL | primary key: true"
        );
    }

    #[test]
    fn test_table_schema_display() {
        let schema = TableSchema {
            table_name: "users".to_string(),
            columns: vec![
                ColumnSchema::new(0, "id", "INTEGER").with_primary_key(true),
                ColumnSchema::new(1, "status", "TEXT").with_default(Some("'new'".to_string())),
            ],
        };
        let text = schema.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Schema for table 'users':");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("primary key: true"));
        assert!(lines[2].contains("default: 'new'"));
    }

    #[test]
    fn test_database_info_display() {
        let info = DatabaseInfo {
            path: PathBuf::from("/tmp/app.db"),
            exists: true,
            size_bytes: 2048,
            table_count: 3,
        };
        let text = info.to_string();
        assert!(text.contains("Database path: /tmp/app.db"));
        assert!(text.contains("Exists: true"));
        assert!(text.contains("Size: 2048 bytes"));
        assert!(text.ends_with("Tables: 3"));
    }
}
