//! Typed error type for the table crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    /// Column lengths within one table must all be equal.
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column names must be non-empty.
    #[error("column names must be non-empty")]
    EmptyColumnName,

    /// Column names must be unique within a table.
    #[error("duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// A lookup referenced a column that is not in the table.
    #[error("no such column: '{0}'")]
    NoSuchColumn(String),

    /// Underlying CSV parse or serialize failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The CSV input contained no data at all.
    #[error("CSV input is empty")]
    EmptyCsv,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
