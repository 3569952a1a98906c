//! Typed error type for the store crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No blob stored under the requested id.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The stored bytes did not parse (or the table did not serialize).
    #[error(transparent)]
    Table(#[from] table::TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
