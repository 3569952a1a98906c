//! `store` crate — where tables come from and where results go.
//!
//! The engine reads source tables and writes result tables through the
//! [`TableStore`] trait; directories (or nothing at all, for the in-memory
//! store) are fixed at construction, never through process-global state.

pub mod error;
pub mod fs;
pub mod mem;

pub use error::StoreError;
pub use fs::FsTableStore;
pub use mem::MemTableStore;

use table::codec::ReadOptions;
use table::Table;

/// Blob storage for source and result tables, keyed by opaque string ids.
pub trait TableStore: Send + Sync {
    /// Read the CSV identified by `id` into a table.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when no such id exists, [`StoreError::Table`]
    /// when the bytes are empty or malformed.
    fn read_csv(&self, id: &str, options: &ReadOptions) -> Result<Table, StoreError>;

    /// Persist `table` as CSV under a fresh id and return the id.
    fn write_csv(&self, table: &Table) -> Result<String, StoreError>;
}
