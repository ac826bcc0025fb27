//! Error types for feature derivation.

use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised while reshaping a table or deriving features from it.
#[derive(Error, Debug)]
pub enum DeriveError {
    /// A key or feature column named in the configuration is not in the table.
    #[error("Missing column: '{0}'")]
    MissingColumn(String),

    /// Two rows map to the same (index, condition) cell of the wide table.
    #[error("Duplicate entry for index {key} and condition '{condition}'")]
    DuplicateEntry { key: String, condition: String },

    /// A feature cell holds a value that cannot be used in arithmetic.
    #[error("Column '{column}' row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// A row was pushed with the wrong number of cells.
    #[error("Row has {actual} values but the table has {expected} columns")]
    RowArity { expected: usize, actual: usize },

    /// A JSON record could not be turned into a row.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// An arrow column type has no cell representation.
    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for derivation operations.
pub type Result<T> = std::result::Result<T, DeriveError>;

impl DeriveError {
    #[must_use]
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn(name.into())
    }

    #[must_use]
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeriveError::missing_column("hu_mean");
        assert_eq!(err.to_string(), "Missing column: 'hu_mean'");

        let err = DeriveError::DuplicateEntry {
            key: "(P1)".into(),
            condition: "Mono_70keV".into(),
        };
        assert!(err.to_string().contains("Mono_70keV"));
        assert!(err.to_string().contains("(P1)"));
    }

    #[test]
    fn test_row_arity_display() {
        let err = DeriveError::RowArity {
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains('2'));
    }
}
