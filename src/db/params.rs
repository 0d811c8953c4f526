//! Named parameter binding for raw queries.
//!
//! The SQLite driver binds arguments positionally and rejects `:name` style
//! placeholders. To bind a caller's name → value mapping, the statement is
//! tokenized with sqlparser's SQLite dialect and every named placeholder
//! (`:name`, `@name`, `$name`) is located by its token position. Each distinct
//! name gets a 1-based index in order of first appearance and is rewritten to
//! `?NNN` in the original text; the values are then bound in index order.
//! Literals, quoted identifiers and comments are single tokens, so nothing
//! inside them is ever rewritten.

use crate::db::value::SqlValue;
use crate::error::{DbError, DbResult};
use serde_json::Value as JsonValue;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer};
use std::collections::HashMap;
use tracing::debug;

const SIGILS: [char; 3] = [':', '@', '$'];

/// A statement with its named placeholders rewritten to numbered ones.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    /// Values in placeholder index order (`?1` is `values[0]`).
    pub values: Vec<SqlValue>,
}

/// Rewrite `sql` and resolve its named placeholders against `params`.
///
/// Keys may be given with or without their sigil (`"id"` or `":id"`).
pub fn bind_named(sql: &str, params: &serde_json::Map<String, JsonValue>) -> DbResult<BoundStatement> {
    let scan = scan_placeholders(sql)?;

    if scan.has_positional && !params.is_empty() {
        return Err(DbError::invalid_input(
            "Positional '?' placeholders cannot be combined with named parameters; \
             use :name placeholders instead",
        ));
    }

    let lookup: HashMap<&str, &JsonValue> = params
        .iter()
        .map(|(k, v)| (k.trim_start_matches(SIGILS), v))
        .collect();

    let mut names: Vec<&str> = Vec::new();
    let mut rewritten = String::with_capacity(sql.len());
    let mut copied_to = 0;
    for placeholder in &scan.named {
        let index = match names.iter().position(|n| *n == placeholder.name) {
            Some(pos) => pos + 1,
            None => {
                names.push(&placeholder.name);
                names.len()
            }
        };
        rewritten.push_str(&sql[copied_to..placeholder.start]);
        rewritten.push_str(&format!("?{}", index));
        copied_to = placeholder.end;
    }
    rewritten.push_str(&sql[copied_to..]);

    let values = names
        .iter()
        .map(|name| {
            lookup
                .get(name)
                .map(|v| SqlValue::from_json(v))
                .ok_or_else(|| {
                    DbError::invalid_input(format!("No value supplied for parameter ':{}'", name))
                })
        })
        .collect::<DbResult<Vec<_>>>()?;

    if lookup.len() > values.len() {
        debug!(
            supplied = lookup.len(),
            used = values.len(),
            "Ignoring parameters with no matching placeholder"
        );
    }

    Ok(BoundStatement {
        sql: rewritten,
        values,
    })
}

/// A named placeholder and its byte range in the statement text.
struct NamedPlaceholder {
    name: String,
    start: usize,
    end: usize,
}

struct Scan {
    named: Vec<NamedPlaceholder>,
    has_positional: bool,
}

/// Name of a sigil-prefixed placeholder, or `None` for `?`, `?NNN` and `$NNN`.
fn placeholder_name(text: &str) -> Option<&str> {
    let name = text.strip_prefix(SIGILS)?;
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

fn unquoted_word(token: &Token) -> Option<&str> {
    match token {
        Token::Word(w) if w.quote_style.is_none() => Some(w.value.as_str()),
        _ => None,
    }
}

fn scan_placeholders(sql: &str) -> DbResult<Scan> {
    let dialect = SQLiteDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .with_unescape(false)
        .tokenize_with_location()
        .map_err(|e| DbError::invalid_input(format!("Failed to tokenize SQL: {}", e)))?;

    let offsets = LineOffsets::new(sql);
    let mut scan = Scan {
        named: Vec::new(),
        has_positional: false,
    };

    let mut iter = tokens.iter().peekable();
    let mut prev: Option<&TokenWithSpan> = None;
    while let Some(tok) = iter.next() {
        // `price$usd` is one identifier to SQLite, whichever way it was split
        let after_word = prev.is_some_and(|p| matches!(p.token, Token::Word(_)));

        let found = match &tok.token {
            Token::Placeholder(text) => match placeholder_name(text) {
                Some(_) if after_word => None,
                Some(name) => Some((name.to_string(), text.clone())),
                None => {
                    scan.has_positional |= text.starts_with('?') || text.starts_with('$');
                    None
                }
            },
            Token::Word(w) if w.quote_style.is_none() && !after_word => {
                placeholder_name(&w.value).map(|name| (name.to_string(), w.value.clone()))
            }
            Token::Colon | Token::AtSign => {
                let sigil = tok.token.to_string();
                match iter.peek().and_then(|next| unquoted_word(&next.token)) {
                    Some(word) => {
                        let text = format!("{}{}", sigil, word);
                        let name = placeholder_name(&text).map(str::to_string);
                        if name.is_some() {
                            iter.next();
                        }
                        name.map(|n| (n, text))
                    }
                    None => None,
                }
            }
            _ => None,
        };

        if let Some((name, text)) = found {
            let start = offsets.byte_offset(sql, tok.span.start);
            let end = start + text.len();
            if sql.get(start..end) != Some(text.as_str()) {
                return Err(DbError::internal(format!(
                    "Could not locate parameter '{}' in the statement text",
                    text
                )));
            }
            scan.named.push(NamedPlaceholder { name, start, end });
        }
        prev = Some(tok);
    }

    Ok(scan)
}

/// Maps the tokenizer's 1-based line/column locations back to byte offsets.
struct LineOffsets {
    starts: Vec<usize>,
}

impl LineOffsets {
    fn new(sql: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(sql.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn byte_offset(&self, sql: &str, location: Location) -> usize {
        let line = usize::try_from(location.line.saturating_sub(1)).unwrap_or(usize::MAX);
        let column = usize::try_from(location.column.saturating_sub(1)).unwrap_or(usize::MAX);
        let Some(&line_start) = self.starts.get(line) else {
            return sql.len();
        };
        sql[line_start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| line_start + i)
            .unwrap_or(sql.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: JsonValue) -> serde_json::Map<String, JsonValue> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_rewrites_named_placeholders_in_order() {
        let bound = bind_named(
            "SELECT * FROM t WHERE a = :a AND b = @b AND c = $c",
            &params(json!({ "c": 3, "a": 1, "b": 2 })),
        )
        .unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a = ?1 AND b = ?2 AND c = ?3");
        assert_eq!(
            bound.values,
            vec![
                SqlValue::Integer(1),
                SqlValue::Integer(2),
                SqlValue::Integer(3)
            ]
        );
    }

    #[test]
    fn test_repeated_name_reuses_index() {
        let bound = bind_named(
            "UPDATE t SET a = :v WHERE b = :v OR c = :w",
            &params(json!({ "v": "x", "w": null })),
        )
        .unwrap();
        assert_eq!(bound.sql, "UPDATE t SET a = ?1 WHERE b = ?1 OR c = ?2");
        assert_eq!(bound.values.len(), 2);
    }

    #[test]
    fn test_keys_with_sigil_are_accepted() {
        let bound = bind_named("SELECT :id", &params(json!({ ":id": 5 }))).unwrap();
        assert_eq!(bound.values, vec![SqlValue::Integer(5)]);
    }

    #[test]
    fn test_literals_and_comments_are_untouched() {
        let sql = "SELECT ':no', \"@no\" -- :no\n FROM t /* @no */ WHERE x = :yes";
        let bound = bind_named(sql, &params(json!({ "yes": 1 }))).unwrap();
        assert_eq!(
            bound.sql,
            "SELECT ':no', \"@no\" -- :no\n FROM t /* @no */ WHERE x = ?1"
        );
    }

    #[test]
    fn test_escaped_quote_inside_literal() {
        let bound = bind_named("SELECT 'it''s :no' , :yes", &params(json!({ "yes": 1 }))).unwrap();
        assert_eq!(bound.sql, "SELECT 'it''s :no' , ?1");
    }

    #[test]
    fn test_dollar_inside_identifier_is_not_a_parameter() {
        let bound = bind_named(
            "UPDATE t SET price$usd = :v WHERE id = :id",
            &params(json!({ "v": 2.5, "id": 1 })),
        )
        .unwrap();
        assert_eq!(bound.sql, "UPDATE t SET price$usd = ?1 WHERE id = ?2");
        assert_eq!(
            bound.values,
            vec![SqlValue::Real(2.5), SqlValue::Integer(1)]
        );
    }

    #[test]
    fn test_placeholders_after_newlines_and_multibyte_text() {
        let bound = bind_named(
            "SELECT 'héllo',\n  :a,\n\t'ünïcode' || :b",
            &params(json!({ "a": 1, "b": "x" })),
        )
        .unwrap();
        assert_eq!(bound.sql, "SELECT 'héllo',\n  ?1,\n\t'ünïcode' || ?2");
    }

    #[test]
    fn test_missing_parameter_is_an_error() {
        let err = bind_named("SELECT :a, :b", &params(json!({ "a": 1 }))).unwrap_err();
        assert!(err.to_string().contains(":b"));
    }

    #[test]
    fn test_positional_with_params_is_an_error() {
        let err = bind_named("SELECT ? , :a", &params(json!({ "a": 1 }))).unwrap_err();
        assert!(err.to_string().contains("Positional"));
    }

    #[test]
    fn test_numbered_dollar_is_not_named() {
        let bound = bind_named("SELECT $1", &serde_json::Map::new()).unwrap();
        assert_eq!(bound.sql, "SELECT $1");
        assert!(bound.values.is_empty());
    }
}
