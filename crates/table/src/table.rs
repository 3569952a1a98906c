//! Columnar table and column types.

use std::sync::Arc;

use crate::error::TableError;
use crate::value::{Kind, Value};

/// A named column. Storage is shared: cloning a column clones an `Arc`, not
/// the values, and there is no mutable access to the cell vector.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: Kind,
    values: Arc<Vec<Value>>,
}

impl Column {
    /// Create a column, inferring the element kind from the first non-null
    /// cell. An all-NULL column has kind [`Kind::Null`].
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Column {
        let kind = values
            .iter()
            .find(|v| !v.is_null())
            .map(Value::kind)
            .unwrap_or(Kind::Null);
        Column {
            name: name.into(),
            kind,
            values: Arc::new(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> &Value {
        &self.values[row]
    }

    /// Same values under a different name. Cheap: shares storage.
    pub fn renamed(&self, name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            kind: self.kind,
            values: Arc::clone(&self.values),
        }
    }

    /// Gather the given row indices into a fresh column.
    pub fn take(&self, indices: &[usize]) -> Column {
        let values: Vec<Value> = indices.iter().map(|&i| self.values[i].clone()).collect();
        Column::new(self.name.clone(), values)
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Column) -> bool {
        self.name == other.name && *self.values == *other.values
    }
}

/// An immutable, ordered collection of equal-length named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from columns.
    ///
    /// # Errors
    /// - [`TableError::LengthMismatch`] if the columns disagree on length.
    /// - [`TableError::EmptyColumnName`] / [`TableError::DuplicateColumn`]
    ///   if the names violate the naming invariant.
    pub fn new(columns: Vec<Column>) -> Result<Table, TableError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for col in &columns {
                if col.name().is_empty() {
                    return Err(TableError::EmptyColumnName);
                }
                if col.len() != expected {
                    return Err(TableError::LengthMismatch {
                        column: col.name().to_string(),
                        expected,
                        actual: col.len(),
                    });
                }
            }
            let mut seen = std::collections::HashSet::new();
            for col in &columns {
                if !seen.insert(col.name()) {
                    return Err(TableError::DuplicateColumn(col.name().to_string()));
                }
            }
        }
        Ok(Table { columns })
    }

    /// A table with no columns and no rows.
    pub fn empty() -> Table {
        Table { columns: Vec::new() }
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Project onto the given columns, in the given order.
    ///
    /// # Errors
    /// [`TableError::NoSuchColumn`] for the first missing name.
    pub fn select(&self, names: &[String]) -> Result<Table, TableError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let col = self
                .column(name)
                .ok_or_else(|| TableError::NoSuchColumn(name.clone()))?;
            columns.push(col.clone());
        }
        Table::new(columns)
    }

    /// Gather the given row indices into a fresh table, preserving column
    /// order. Indices may repeat and need not be sorted.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self.columns.iter().map(|c| c.take(indices)).collect();
        Table { columns }
    }

    /// Replace the column named like `column`, or append it at the end.
    pub fn with_column(&self, column: Column) -> Result<Table, TableError> {
        let mut columns = self.columns.clone();
        match columns.iter().position(|c| c.name() == column.name()) {
            Some(i) => columns[i] = column,
            None => columns.push(column),
        }
        Table::new(columns)
    }

    /// One row as a JSON object, keyed by column name.
    pub fn row_json(&self, row: usize) -> serde_json::Map<String, serde_json::Value> {
        self.columns
            .iter()
            .map(|c| (c.name().to_string(), c.get(row).to_json()))
            .collect()
    }

    /// Up to `n` leading rows as JSON objects.
    pub fn preview(&self, n: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
        (0..self.num_rows().min(n)).map(|i| self.row_json(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(name: &str, vals: &[i64]) -> Column {
        Column::new(name, vals.iter().map(|&i| Value::Int(i)).collect())
    }

    #[test]
    fn rejects_unequal_column_lengths() {
        let err = Table::new(vec![ints("a", &[1, 2]), ints("b", &[1])]).unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![ints("a", &[1]), ints("a", &[2])]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));
    }

    #[test]
    fn select_reorders_columns() {
        let t = Table::new(vec![ints("a", &[1]), ints("b", &[2])]).unwrap();
        let s = t.select(&["b".into(), "a".into()]).unwrap();
        assert_eq!(s.column_names(), vec!["b", "a"]);
    }

    #[test]
    fn select_missing_column_fails() {
        let t = Table::new(vec![ints("a", &[1])]).unwrap();
        assert!(matches!(
            t.select(&["ghost".into()]),
            Err(TableError::NoSuchColumn(c)) if c == "ghost"
        ));
    }

    #[test]
    fn take_rows_gathers_in_order() {
        let t = Table::new(vec![ints("a", &[10, 20, 30])]).unwrap();
        let g = t.take_rows(&[2, 0]);
        assert_eq!(g.column("a").unwrap().values(), &[Value::Int(30), Value::Int(10)]);
    }

    #[test]
    fn clones_share_storage_without_leaking_mutation() {
        // There is no mutable access at all; equality after cloning and
        // operating on the clone is the observable immutability contract.
        let t = Table::new(vec![ints("a", &[1, 2, 3])]).unwrap();
        let snapshot = t.clone();
        let _filtered = t.take_rows(&[0]);
        let _extended = t.with_column(ints("b", &[4, 5, 6])).unwrap();
        assert_eq!(t, snapshot);
    }

    #[test]
    fn with_column_replaces_existing_name_in_place() {
        let t = Table::new(vec![ints("a", &[1]), ints("b", &[2])]).unwrap();
        let t2 = t.with_column(ints("a", &[9])).unwrap();
        assert_eq!(t2.column_names(), vec!["a", "b"]);
        assert_eq!(t2.column("a").unwrap().values(), &[Value::Int(9)]);
    }
}
