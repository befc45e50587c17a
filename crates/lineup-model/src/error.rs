//! Custom error types for the view-model layer.
//!
//! Every failure the model can raise belongs to one "parsing failed" family,
//! [`ViewModelError`]. Each variant carries a human-readable message and a
//! structured context map so that a caller can present both to the end user.
//!
//! Errors are serializable as `{code, message, context}` for hosts that
//! forward them across a process or language boundary.

use serde::Serialize;
use serde::ser::SerializeStruct;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use thiserror::Error;

/// User-facing message for an empty data column set.
pub const NO_COLUMNS_MESSAGE: &str =
    "No data columns found. Please add at least one data column to the data fields.";
/// User-facing message for a data column whose scalar type is unknown.
pub const UNKNOWN_COLUMN_TYPE_MESSAGE: &str = "Unknown column data type";
/// User-facing message for a malformed similar-IDs cell.
pub const INVALID_IDS_MESSAGE: &str =
    "Invalid column data type. Please select a column with numbers separated by semi-colons.";
/// User-facing message for an event column that is not date typed.
pub const INVALID_EVENT_TYPE_MESSAGE: &str =
    "Invalid column type for Event Column. Please select a column of type date.";
/// User-facing message for a malformed custom column mapping.
pub const CUSTOM_MAPPING_MESSAGE: &str =
    "Invalid custom column mapping. Please enter a valid JSON object.";

/// The main error type for the view-model layer.
#[derive(Error, Debug)]
pub enum ViewModelError {
    /// An event-role column is not declared as a date column.
    #[error("{}", INVALID_EVENT_TYPE_MESSAGE)]
    EventColumnNotDate { column: String, types: String },

    /// A similar-IDs cell is neither null nor a string.
    #[error("{}", INVALID_IDS_MESSAGE)]
    InvalidSimilarIds { column: String, value: Value },

    /// A similar-durations cell is neither null nor a string.
    #[error("Invalid value in durations column '{column}'. Expected numbers separated by semi-colons.")]
    InvalidDurationsValue { column: String, value: Value },

    /// A data column has no scalar type the presentation layer can map.
    #[error("{} {column}", UNKNOWN_COLUMN_TYPE_MESSAGE)]
    UnknownColumnType { column: String, query_name: String },

    /// No data-role column is present.
    #[error("{}", NO_COLUMNS_MESSAGE)]
    NoColumns,

    /// A column does not have the row count fixed by the first column.
    #[error("Column '{column}' has {actual} values but the dataset has {expected} rows")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// The custom column mapping setting could not be interpreted.
    #[error("{reason}")]
    CustomMapping { reason: String, input: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A role assignment names a column that is not in the source frame.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ViewModelError>,
    },
}

impl ViewModelError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ViewModelError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for host handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EventColumnNotDate { .. } => "INVALID_COLUMN_TYPE_NO_DATE",
            Self::InvalidSimilarIds { .. } => "INVALID_COLUMN_TYPE_IDS",
            Self::InvalidDurationsValue { .. } => "INVALID_DURATIONS_VALUE",
            Self::UnknownColumnType { .. } => "UNKNOWN_COLUMN_TYPE",
            Self::NoColumns => "NO_COLUMNS",
            Self::ColumnLengthMismatch { .. } => "COLUMN_LENGTH_MISMATCH",
            Self::CustomMapping { .. } => "CUSTOM_MAPPING",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Structured diagnostics for the end user, keyed by field name.
    ///
    /// Variants without extra detail return an empty map.
    pub fn context(&self) -> BTreeMap<String, Value> {
        let mut context = BTreeMap::new();
        match self {
            Self::EventColumnNotDate { column, types } => {
                context.insert("column".to_string(), json!(column));
                context.insert("types".to_string(), json!(types));
            }
            Self::InvalidSimilarIds { column, value }
            | Self::InvalidDurationsValue { column, value } => {
                context.insert("column".to_string(), json!(column));
                context.insert("value".to_string(), value.clone());
            }
            Self::UnknownColumnType { column, query_name } => {
                context.insert("name".to_string(), json!(column));
                context.insert("queryName".to_string(), json!(query_name));
            }
            Self::ColumnLengthMismatch {
                column,
                expected,
                actual,
            } => {
                context.insert("column".to_string(), json!(column));
                context.insert("expected".to_string(), json!(expected));
                context.insert("actual".to_string(), json!(actual));
            }
            Self::CustomMapping { input, .. } => {
                context.insert("error".to_string(), json!(CUSTOM_MAPPING_MESSAGE));
                context.insert("invalid JSON".to_string(), json!(input));
            }
            Self::ColumnNotFound(column) => {
                context.insert("column".to_string(), json!(column));
            }
            Self::WithContext { source, .. } => return source.context(),
            Self::NoColumns
            | Self::InvalidConfig(_)
            | Self::Io(_)
            | Self::Polars(_)
            | Self::Json(_) => {}
        }
        context
    }

    /// Check if this error was raised while interpreting cell values or
    /// column declarations, as opposed to IO or configuration problems.
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::EventColumnNotDate { .. }
            | Self::InvalidSimilarIds { .. }
            | Self::InvalidDurationsValue { .. }
            | Self::UnknownColumnType { .. }
            | Self::NoColumns
            | Self::ColumnLengthMismatch { .. } => true,
            Self::WithContext { source, .. } => source.is_data_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code`, `message` and `context`.
impl Serialize for ViewModelError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ViewModelError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.serialize_field("context", &self.context())?;
        state.end()
    }
}

/// Result type alias for view-model operations.
pub type Result<T> = std::result::Result<T, ViewModelError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ViewModelError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(ViewModelError::NoColumns.error_code(), "NO_COLUMNS");
        assert_eq!(
            ViewModelError::ColumnNotFound("test".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_event_type_context_lists_flags() {
        let error = ViewModelError::EventColumnNotDate {
            column: "Admission".to_string(),
            types: "numeric, text".to_string(),
        };
        let context = error.context();
        assert_eq!(context["column"], json!("Admission"));
        assert_eq!(context["types"], json!("numeric, text"));
        assert_eq!(error.to_string(), INVALID_EVENT_TYPE_MESSAGE);
    }

    #[test]
    fn test_similar_ids_context_keeps_value() {
        let error = ViewModelError::InvalidSimilarIds {
            column: "Similar".to_string(),
            value: json!(42.0),
        };
        assert_eq!(error.context()["value"], json!(42.0));
        assert!(error.is_data_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = ViewModelError::ColumnLengthMismatch {
            column: "Age".to_string(),
            expected: 3,
            actual: 2,
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_LENGTH_MISMATCH"));
        assert!(json.contains("Age"));
        assert!(json.contains("\"expected\":3"));
    }

    #[test]
    fn test_with_context() {
        let error =
            ViewModelError::ColumnNotFound("test".to_string()).with_context("During ingest");
        assert!(error.to_string().contains("During ingest"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND"); // Preserves original code
        assert_eq!(error.context()["column"], json!("test"));
    }

    #[test]
    fn test_config_errors_are_not_data_errors() {
        assert!(!ViewModelError::InvalidConfig("x".to_string()).is_data_error());
        assert!(ViewModelError::NoColumns.is_data_error());
    }
}
