//! Error types for Cull

use thiserror::Error;

/// The main error type for bulk operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid builder configuration
    #[error("Invalid bulk operation: {message}")]
    InvalidOperation { message: String },

    /// Id column missing from the supplied row type
    #[error("Column '{column}' not found on the supplied rows")]
    ColumnNotFound { column: String },

    /// A staged column holds values of incompatible SQL types
    #[error("Conflicting types for column '{column}': {first} vs {second}")]
    TypeConflict {
        column: String,
        first: &'static str,
        second: &'static str,
    },

    /// A statement exceeded the configured timeout
    #[error("Statement timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Convenience Result type for bulk operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create a new column not found error
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Create a new type conflict error
    pub fn type_conflict(column: impl Into<String>, first: &'static str, second: &'static str) -> Self {
        Self::TypeConflict {
            column: column.into(),
            first,
            second,
        }
    }
}
