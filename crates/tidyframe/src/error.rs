//! Error types for the tidyframe library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tidyframe operations.
#[derive(Debug, Error)]
pub enum TidyError {
    /// A grouping column is not a column of the table.
    #[error("Invalid grouping variable(s): {}", .0.join(", "))]
    InvalidGroupVars(Vec<String>),

    /// A strictly selected column does not exist.
    #[error("Can't subset columns that don't exist: {}", .0.join(", "))]
    UnknownColumn(Vec<String>),

    /// A kernel that needs numeric input received something else.
    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// Join key inference found no common columns.
    #[error("No common columns to join by; specify `by` explicitly")]
    AmbiguousKey,

    /// A column's length does not agree with the table height.
    #[error("Length mismatch for '{column}': expected {expected}, found {actual}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns share a name where names must be unique.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Expression calls a function that is not in the library.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// No verb registered under this name for the table's grouping kind.
    #[error("No verb '{verb}' registered for {kind} tables")]
    UnknownVerb { verb: String, kind: String },

    /// An argument or option has an unusable value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl TidyError {
    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        TidyError::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type alias for tidyframe operations.
pub type Result<T> = std::result::Result<T, TidyError>;
