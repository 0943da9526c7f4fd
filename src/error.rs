//! Structured error types for the estimation engine.
//!
//! Numeric input problems never show up here: the pricer coerces them to
//! zero. These variants are the structural failures that abort a document
//! export.

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// JSON input failed to parse as an estimate, item, or config.
    #[error("failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// An item carried a `type` the engine does not price or render.
    #[error("unsupported item type '{0}'")]
    UnsupportedItemType(String),

    /// The organizer handed the table builder a group with no members.
    #[error("no rows for {category} / {subcategory}")]
    EmptyGroup {
        category: String,
        subcategory: String,
    },

    /// The estimate has nothing to export.
    #[error("estimate has no line items")]
    NoItems,

    /// A total ended up NaN or infinite after recalculation.
    #[error("non-finite total on {0}")]
    InvalidTotal(String),

    /// Document configuration could not be used.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EstimateError>;

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for EstimateError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the estimate schema. Check field names and the item `type`.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        EstimateError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_hint() {
        let err: EstimateError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("trailing commas"), "got: {msg}");
    }

    #[test]
    fn empty_group_names_the_group() {
        let err = EstimateError::EmptyGroup {
            category: "Kitchen".to_string(),
            subcategory: "Cabinets".to_string(),
        };
        assert_eq!(err.to_string(), "no rows for Kitchen / Cabinets");
    }
}
