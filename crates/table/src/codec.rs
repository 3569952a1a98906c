//! CSV codec: RFC 4180-style read/write with per-column type inference.
//!
//! Inference order per column, over the non-null cells: int64 if every cell
//! parses as an integer; else float64 if every cell parses as a number; else
//! bool if every cell is one of true/false/True/False; else string. Empty
//! cells are NULL in every kind.

use std::io::{Read, Write};

use crate::error::TableError;
use crate::table::{Column, Table};
use crate::value::Value;

/// Options for [`read_csv`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Whether the first row is a header. Without one, columns are named by
    /// ordinal position ("0", "1", ...).
    pub has_header: bool,
    pub delimiter: u8,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            has_header: true,
            delimiter: b',',
        }
    }
}

/// Read a CSV document into a [`Table`].
///
/// # Errors
/// [`TableError::EmptyCsv`] when the input holds no header and no rows;
/// [`TableError::Csv`] on malformed input (ragged rows, bad quoting).
pub fn read_csv<R: Read>(reader: R, options: &ReadOptions) -> Result<Table, TableError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let header: Option<Vec<String>> = if options.has_header {
        let h = rdr.headers()?;
        if h.is_empty() {
            return Err(TableError::EmptyCsv);
        }
        Some(h.iter().map(str::to_string).collect())
    } else {
        None
    };

    let mut cells: Vec<Vec<Option<String>>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if cells.is_empty() {
            cells = vec![Vec::new(); record.len()];
        }
        for (i, field) in record.iter().enumerate() {
            let cell = if field.is_empty() {
                None
            } else {
                Some(field.to_string())
            };
            cells[i].push(cell);
        }
    }

    let names: Vec<String> = match header {
        Some(names) => names,
        None if cells.is_empty() => return Err(TableError::EmptyCsv),
        None => (0..cells.len()).map(|i| i.to_string()).collect(),
    };

    // A header with no data rows still yields a valid zero-row table.
    if cells.is_empty() {
        cells = vec![Vec::new(); names.len()];
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::new(name, infer_column(&raw)))
        .collect();
    Table::new(columns)
}

/// Write a [`Table`] as CSV: header row, LF line endings, no index column.
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<(), TableError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(table.column_names())?;
    for row in 0..table.num_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.get(row).to_string())
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn infer_column(raw: &[Option<String>]) -> Vec<Value> {
    let non_null = || raw.iter().flatten();

    if non_null().all(|s| s.trim().parse::<i64>().is_ok()) {
        return raw
            .iter()
            .map(|c| match c {
                Some(s) => Value::Int(s.trim().parse().unwrap_or_default()),
                None => Value::Null,
            })
            .collect();
    }
    if non_null().all(|s| s.trim().parse::<f64>().is_ok()) {
        return raw
            .iter()
            .map(|c| match c {
                Some(s) => Value::float(s.trim().parse().unwrap_or_default()),
                None => Value::Null,
            })
            .collect();
    }
    if non_null().all(|s| matches!(s.trim(), "true" | "false" | "True" | "False")) {
        return raw
            .iter()
            .map(|c| match c {
                Some(s) => Value::Bool(matches!(s.trim(), "true" | "True")),
                None => Value::Null,
            })
            .collect();
    }
    raw.iter()
        .map(|c| match c {
            Some(s) => Value::Str(s.clone()),
            None => Value::Null,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;

    fn read(text: &str) -> Table {
        read_csv(text.as_bytes(), &ReadOptions::default()).unwrap()
    }

    #[test]
    fn infers_int_float_bool_string() {
        let t = read("a,b,c,d\n1,1.5,true,x\n2,2,False,y\n");
        assert_eq!(t.column("a").unwrap().kind(), Kind::Int);
        assert_eq!(t.column("b").unwrap().kind(), Kind::Float);
        assert_eq!(t.column("c").unwrap().kind(), Kind::Bool);
        assert_eq!(t.column("d").unwrap().kind(), Kind::Str);
    }

    #[test]
    fn empty_cells_become_null() {
        let t = read("a,b\n1,\n,2\n");
        assert_eq!(t.column("a").unwrap().values()[1], Value::Null);
        assert_eq!(t.column("b").unwrap().values()[0], Value::Null);
        // Nulls don't demote the inferred kind.
        assert_eq!(t.column("a").unwrap().kind(), Kind::Int);
    }

    #[test]
    fn one_float_cell_promotes_the_column() {
        let t = read("a\n1\n2.5\n3\n");
        assert_eq!(t.column("a").unwrap().kind(), Kind::Float);
        assert_eq!(t.column("a").unwrap().values()[0], Value::Float(1.0));
    }

    #[test]
    fn headerless_columns_are_named_by_position() {
        let opts = ReadOptions {
            has_header: false,
            ..ReadOptions::default()
        };
        let t = read_csv("1,x\n2,y\n".as_bytes(), &opts).unwrap();
        assert_eq!(t.column_names(), vec!["0", "1"]);
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn custom_delimiter() {
        let opts = ReadOptions {
            delimiter: b';',
            ..ReadOptions::default()
        };
        let t = read_csv("a;b\n1;2\n".as_bytes(), &opts).unwrap();
        assert_eq!(t.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = read_csv("".as_bytes(), &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, TableError::EmptyCsv));
    }

    #[test]
    fn quoted_fields_round_trip() {
        let t = read("a,b\n\"x,y\",2\n");
        assert_eq!(
            t.column("a").unwrap().values()[0],
            Value::Str("x,y".to_string())
        );

        let mut out = Vec::new();
        write_csv(&mut out, &t).unwrap();
        let again = read(std::str::from_utf8(&out).unwrap());
        assert_eq!(t, again);
    }

    #[test]
    fn write_formats_nulls_bools_and_floats() {
        let t = Table::new(vec![
            Column::new("f", vec![Value::Float(2.0), Value::Null]),
            Column::new("b", vec![Value::Bool(true), Value::Bool(false)]),
        ])
        .unwrap();
        let mut out = Vec::new();
        write_csv(&mut out, &t).unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap(), "f,b\n2.0,True\n,False\n");
    }
}
