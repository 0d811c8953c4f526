//! Operation outcomes.
//!
//! Operations resolve to a tagged `OperationOutcome` so callers and tests can
//! branch on the result kind. Only at the tool boundary is the outcome
//! flattened into the text contract: a message, a JSON array of records, or an
//! error message.

use crate::db::value::RecordSet;
use crate::error::DbError;

#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
    /// Human-readable success text (including zero-row results)
    Message(String),
    /// Rows of a read operation
    Records(RecordSet),
    /// Error text, already prefixed with the operation context
    Failure(String),
}

impl OperationOutcome {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Build a failure from an operation context such as
    /// `"Error listing tables"` and the error that ended the operation.
    pub fn failure(context: &str, err: &DbError) -> Self {
        Self::Failure(format!("{}: {}", context, err))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Flatten to the wire text.
    pub fn into_text(self) -> String {
        match self {
            Self::Message(text) | Self::Failure(text) => text,
            Self::Records(rows) => serde_json::to_string(&rows)
                .unwrap_or_else(|e| format!("Error serializing records: {}", e)),
        }
    }
}
