//! Single-input transformation nodes: Filter, Select, Sort, Formula.

use std::cmp::Ordering;

use expr::Program;
use serde::Deserialize;
use table::{Table, Value};

use crate::traits::{parse_config, single_input, Node, NodeContext, NodeOutput};
use crate::NodeError;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FilterConfig {
    #[serde(default)]
    expression: String,
}

/// Keep the rows matching an expression. An empty expression passes every
/// row through.
#[derive(Debug)]
pub struct FilterNode {
    program: Option<Program>,
}

impl FilterNode {
    pub fn from_config(config: &serde_json::Value) -> Result<FilterNode, NodeError> {
        let cfg: FilterConfig = parse_config(config)?;
        let program = if cfg.expression.trim().is_empty() {
            None
        } else {
            Some(Program::compile(&cfg.expression)?)
        };
        Ok(FilterNode { program })
    }
}

impl Node for FilterNode {
    fn execute(&self, inputs: Vec<Table>, _ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let table = single_input(inputs, "filter")?;
        let Some(program) = &self.program else {
            return Ok(NodeOutput::table(table));
        };
        let before = table.num_rows();
        let filtered = program.filter(&table)?;
        let removed = before - filtered.num_rows();
        Ok(NodeOutput::table(filtered)
            .with_meta("expression", program.source())
            .with_meta("filtered_rows", removed))
    }
}

// ---------------------------------------------------------------------------
// Select
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SelectConfig {
    #[serde(default)]
    columns: Vec<String>,
}

/// Project onto the configured columns, in the configured order. An empty
/// list keeps everything.
pub struct SelectNode {
    columns: Vec<String>,
}

impl SelectNode {
    pub fn from_config(config: &serde_json::Value) -> Result<SelectNode, NodeError> {
        let cfg: SelectConfig = parse_config(config)?;
        Ok(SelectNode {
            columns: cfg.columns,
        })
    }
}

impl Node for SelectNode {
    fn execute(&self, inputs: Vec<Table>, _ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let table = single_input(inputs, "select")?;
        if self.columns.is_empty() {
            return Ok(NodeOutput::table(table));
        }

        let missing: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|c| !table.has_column(c))
            .collect();
        if !missing.is_empty() {
            return Err(NodeError::Schema(format!(
                "Columns not found: {}",
                missing.join(", ")
            )));
        }

        let selected = table.select(&self.columns)?;
        Ok(NodeOutput::table(selected))
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

/// Either one direction for every key or one per key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Ascending {
    Uniform(bool),
    PerColumn(Vec<bool>),
}

impl Default for Ascending {
    fn default() -> Self {
        Ascending::Uniform(true)
    }
}

#[derive(Debug, Deserialize)]
struct SortConfig {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    ascending: Ascending,
}

/// Stable multi-key sort. NULLs order last in both directions.
#[derive(Debug)]
pub struct SortNode {
    keys: Vec<(String, bool)>,
}

impl SortNode {
    pub fn from_config(config: &serde_json::Value) -> Result<SortNode, NodeError> {
        let cfg: SortConfig = parse_config(config)?;
        let directions: Vec<bool> = match cfg.ascending {
            Ascending::Uniform(asc) => vec![asc; cfg.columns.len()],
            Ascending::PerColumn(list) => {
                if list.len() != cfg.columns.len() {
                    return Err(NodeError::Config(format!(
                        "ascending has {} entries for {} sort columns",
                        list.len(),
                        cfg.columns.len()
                    )));
                }
                list
            }
        };
        Ok(SortNode {
            keys: cfg.columns.into_iter().zip(directions).collect(),
        })
    }

    fn key_cmp(a: &Value, b: &Value, ascending: bool) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a.total_cmp(b);
                if ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
        }
    }
}

impl Node for SortNode {
    fn execute(&self, inputs: Vec<Table>, _ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let table = single_input(inputs, "sort")?;
        if self.keys.is_empty() {
            return Ok(NodeOutput::table(table));
        }

        let missing: Vec<&str> = self
            .keys
            .iter()
            .map(|(c, _)| c.as_str())
            .filter(|c| !table.has_column(c))
            .collect();
        if !missing.is_empty() {
            return Err(NodeError::Schema(format!(
                "Sort columns not found: {}",
                missing.join(", ")
            )));
        }

        let key_columns: Vec<(&table::Column, bool)> = self
            .keys
            .iter()
            .map(|(name, asc)| (table.column(name).unwrap_or_else(|| unreachable!()), *asc))
            .collect();

        let mut order: Vec<usize> = (0..table.num_rows()).collect();
        order.sort_by(|&x, &y| {
            for (col, asc) in &key_columns {
                let ord = Self::key_cmp(col.get(x), col.get(y), *asc);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        Ok(NodeOutput::table(table.take_rows(&order)))
    }
}

// ---------------------------------------------------------------------------
// Formula
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FormulaConfig {
    #[serde(rename = "newCol", alias = "new_col", default)]
    new_col: String,
    #[serde(default)]
    expression: String,
}

/// Append (or replace) a calculated column.
#[derive(Debug)]
pub struct FormulaNode {
    new_col: String,
    program: Program,
}

impl FormulaNode {
    pub fn from_config(config: &serde_json::Value) -> Result<FormulaNode, NodeError> {
        let cfg: FormulaConfig = parse_config(config)?;
        if cfg.new_col.is_empty() {
            return Err(NodeError::Config("newCol is required".into()));
        }
        if cfg.expression.trim().is_empty() {
            return Err(NodeError::Config("expression is required".into()));
        }
        Ok(FormulaNode {
            new_col: cfg.new_col,
            program: Program::compile(&cfg.expression)?,
        })
    }
}

impl Node for FormulaNode {
    fn execute(&self, inputs: Vec<Table>, _ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let table = single_input(inputs, "formula")?;
        let result = self.program.formula(&table, &self.new_col)?;
        Ok(NodeOutput::table(result)
            .with_meta("new_column", self.new_col.clone())
            .with_meta("expression", self.program.source()))
    }
}
