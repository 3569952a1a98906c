//! In-memory table store, used by tests and embedded callers.

use std::collections::HashMap;
use std::sync::Mutex;

use table::codec::ReadOptions;
use table::Table;
use uuid::Uuid;

use crate::{StoreError, TableStore};

/// Holds parsed tables directly; [`ReadOptions`] are ignored since there are
/// no bytes to re-parse.
#[derive(Debug, Default)]
pub struct MemTableStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl MemTableStore {
    pub fn new() -> MemTableStore {
        MemTableStore::default()
    }

    /// Register a source table under a caller-chosen id.
    pub fn insert(&self, id: impl Into<String>, table: Table) {
        self.tables.lock().unwrap().insert(id.into(), table);
    }

    /// Fetch a stored table (source or written output) by id.
    pub fn get(&self, id: &str) -> Option<Table> {
        self.tables.lock().unwrap().get(id).cloned()
    }
}

impl TableStore for MemTableStore {
    fn read_csv(&self, id: &str, _options: &ReadOptions) -> Result<Table, StoreError> {
        self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn write_csv(&self, table: &Table) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.insert(id.clone(), table.clone());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table::{Column, Value};

    #[test]
    fn read_write_round_trip() {
        let store = MemTableStore::new();
        let table = Table::new(vec![Column::new("a", vec![Value::Int(1)])]).unwrap();
        store.insert("src", table.clone());

        assert_eq!(
            store.read_csv("src", &ReadOptions::default()).unwrap(),
            table
        );
        let id = store.write_csv(&table).unwrap();
        assert_eq!(store.get(&id).unwrap(), table);
    }
}
