//! Two-input and grouping nodes: Join and Aggregate.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Deserialize;
use table::value::KeyValue;
use table::{Column, Table, Value};

use crate::traits::{parse_config, single_input, Node, NodeContext, NodeOutput};
use crate::NodeError;

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

#[derive(Debug, Deserialize)]
struct JoinConfig {
    #[serde(rename = "leftKey", alias = "left_key", default)]
    left_key: String,
    #[serde(rename = "rightKey", alias = "right_key", default)]
    right_key: String,
    #[serde(default = "default_join_kind")]
    how: JoinKind,
}

fn default_join_kind() -> JoinKind {
    JoinKind::Inner
}

/// Combine two tables on matching key values.
///
/// Inputs are positional: `in_0` is the left side, `in_1` the right. Result
/// columns are all left columns followed by all right columns; name
/// collisions other than a shared key name get `_left` / `_right` suffixes.
pub struct JoinNode {
    left_key: String,
    right_key: String,
    how: JoinKind,
}

impl JoinNode {
    pub fn from_config(config: &serde_json::Value) -> Result<JoinNode, NodeError> {
        let cfg: JoinConfig = parse_config(config)?;
        if cfg.left_key.is_empty() {
            return Err(NodeError::Config("leftKey is required".into()));
        }
        if cfg.right_key.is_empty() {
            return Err(NodeError::Config("rightKey is required".into()));
        }
        Ok(JoinNode {
            left_key: cfg.left_key,
            right_key: cfg.right_key,
            how: cfg.how,
        })
    }

    /// Produce (left row, right row) pairs in the result order. `None` marks
    /// the null-filled side of an unmatched row.
    fn pair_rows(
        &self,
        left: &Column,
        right: &Column,
    ) -> Vec<(Option<usize>, Option<usize>)> {
        let mut by_right_key: HashMap<KeyValue, Vec<usize>> = HashMap::new();
        for (j, v) in right.values().iter().enumerate() {
            by_right_key.entry(KeyValue(v.clone())).or_default().push(j);
        }

        let mut pairs = Vec::new();
        match self.how {
            JoinKind::Inner | JoinKind::Left | JoinKind::Outer => {
                let mut right_matched = vec![false; right.len()];
                for (i, v) in left.values().iter().enumerate() {
                    match by_right_key.get(&KeyValue(v.clone())) {
                        Some(matches) => {
                            for &j in matches {
                                right_matched[j] = true;
                                pairs.push((Some(i), Some(j)));
                            }
                        }
                        None => {
                            if self.how != JoinKind::Inner {
                                pairs.push((Some(i), None));
                            }
                        }
                    }
                }
                if self.how == JoinKind::Outer {
                    for (j, matched) in right_matched.iter().enumerate() {
                        if !matched {
                            pairs.push((None, Some(j)));
                        }
                    }
                }
            }
            JoinKind::Right => {
                let mut by_left_key: HashMap<KeyValue, Vec<usize>> = HashMap::new();
                for (i, v) in left.values().iter().enumerate() {
                    by_left_key.entry(KeyValue(v.clone())).or_default().push(i);
                }
                for (j, v) in right.values().iter().enumerate() {
                    match by_left_key.get(&KeyValue(v.clone())) {
                        Some(matches) => {
                            for &i in matches {
                                pairs.push((Some(i), Some(j)));
                            }
                        }
                        None => pairs.push((None, Some(j))),
                    }
                }
            }
        }
        pairs
    }
}

impl Node for JoinNode {
    fn execute(
        &self,
        mut inputs: Vec<Table>,
        _ctx: &NodeContext<'_>,
    ) -> Result<NodeOutput, NodeError> {
        if inputs.len() < 2 {
            return Err(NodeError::Input(format!(
                "Join requires 2 inputs, got {}",
                inputs.len()
            )));
        }
        let right_table = inputs.swap_remove(1);
        let left_table = inputs.swap_remove(0);

        let left_key = left_table.column(&self.left_key).ok_or_else(|| {
            NodeError::Schema(format!(
                "Left key '{}' not found in left dataset. Available: {}",
                self.left_key,
                left_table.column_names().join(", ")
            ))
        })?;
        let right_key = right_table.column(&self.right_key).ok_or_else(|| {
            NodeError::Schema(format!(
                "Right key '{}' not found in right dataset. Available: {}",
                self.right_key,
                right_table.column_names().join(", ")
            ))
        })?;

        let pairs = self.pair_rows(left_key, right_key);
        let shared_key_name = self.left_key == self.right_key;

        let gather = |col: &Column, side: fn(&(Option<usize>, Option<usize>)) -> Option<usize>| {
            let values: Vec<Value> = pairs
                .iter()
                .map(|p| match side(p) {
                    Some(row) => col.get(row).clone(),
                    None => Value::Null,
                })
                .collect();
            values
        };

        let mut columns: Vec<Column> = Vec::new();
        for col in left_table.columns() {
            if shared_key_name && col.name() == self.left_key {
                // Shared key name: one merged column, filled from whichever
                // side the row came from.
                let values: Vec<Value> = pairs
                    .iter()
                    .map(|(l, r)| match (l, r) {
                        (Some(i), _) => col.get(*i).clone(),
                        (None, Some(j)) => right_key.get(*j).clone(),
                        (None, None) => Value::Null,
                    })
                    .collect();
                columns.push(Column::new(col.name(), values));
                continue;
            }
            let name = if right_table.has_column(col.name()) {
                format!("{}_left", col.name())
            } else {
                col.name().to_string()
            };
            columns.push(Column::new(name, gather(col, |p| p.0)));
        }
        for col in right_table.columns() {
            if shared_key_name && col.name() == self.right_key {
                continue; // merged into the left key column
            }
            let name = if left_table.has_column(col.name()) {
                format!("{}_right", col.name())
            } else {
                col.name().to_string()
            };
            columns.push(Column::new(name, gather(col, |p| p.1)));
        }

        let result = Table::new(columns)?;
        let meta_rows = result.num_rows();
        Ok(NodeOutput::table(result)
            .with_meta("left_rows", left_table.num_rows())
            .with_meta("right_rows", right_table.num_rows())
            .with_meta("result_rows", meta_rows)
            .with_meta("join_type", format!("{:?}", self.how).to_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AggOp {
    Sum,
    Mean,
    Count,
    Min,
    Max,
    First,
    Last,
    Std,
    Var,
}

impl fmt::Display for AggOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AggOp::Sum => "sum",
            AggOp::Mean => "mean",
            AggOp::Count => "count",
            AggOp::Min => "min",
            AggOp::Max => "max",
            AggOp::First => "first",
            AggOp::Last => "last",
            AggOp::Std => "std",
            AggOp::Var => "var",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Deserialize)]
struct AggSpec {
    col: String,
    op: AggOp,
    #[serde(rename = "as", alias = "alias", default)]
    alias: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggregateConfig {
    #[serde(rename = "groupBy", alias = "group_by", default)]
    group_by: Vec<String>,
    #[serde(default)]
    aggregations: Vec<AggSpec>,
}

/// Group rows by key columns and reduce each group.
///
/// Output columns are the group keys (configured order) followed by one
/// column per aggregation; rows are ordered by ascending group key. Rows
/// whose key tuple contains NULL are dropped.
pub struct AggregateNode {
    group_by: Vec<String>,
    aggregations: Vec<(String, AggOp, String)>,
}

impl AggregateNode {
    pub fn from_config(config: &serde_json::Value) -> Result<AggregateNode, NodeError> {
        let cfg: AggregateConfig = parse_config(config)?;
        if cfg.group_by.is_empty() {
            return Err(NodeError::Config("groupBy columns are required".into()));
        }
        if cfg.aggregations.is_empty() {
            return Err(NodeError::Config(
                "At least one aggregation is required".into(),
            ));
        }
        let aggregations = cfg
            .aggregations
            .into_iter()
            .map(|spec| {
                if spec.col.is_empty() {
                    return Err(NodeError::Config("Aggregation missing 'col'".into()));
                }
                let alias = spec
                    .alias
                    .unwrap_or_else(|| format!("{}_{}", spec.col, spec.op));
                Ok((spec.col, spec.op, alias))
            })
            .collect::<Result<Vec<_>, NodeError>>()?;
        Ok(AggregateNode {
            group_by: cfg.group_by,
            aggregations,
        })
    }
}

/// Group key ordered by lexicographic tuple compare, so a BTreeMap yields
/// the output row order directly.
#[derive(Debug)]
struct GroupKey(Vec<Value>);

impl PartialEq for GroupKey {
    fn eq(&self, other: &GroupKey) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &GroupKey) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &GroupKey) -> std::cmp::Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            let ord = a.total_cmp(b);
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl Node for AggregateNode {
    fn execute(&self, inputs: Vec<Table>, _ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let table = single_input(inputs, "aggregate")?;

        let missing: Vec<&str> = self
            .group_by
            .iter()
            .map(String::as_str)
            .filter(|c| !table.has_column(c))
            .collect();
        if !missing.is_empty() {
            return Err(NodeError::Schema(format!(
                "Group columns not found: {}",
                missing.join(", ")
            )));
        }
        for (col, _, _) in &self.aggregations {
            if !table.has_column(col) {
                return Err(NodeError::Schema(format!(
                    "Aggregation column not found: {col}"
                )));
            }
        }

        let key_columns: Vec<&Column> = self
            .group_by
            .iter()
            .filter_map(|name| table.column(name))
            .collect();

        let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        'rows: for row in 0..table.num_rows() {
            let mut key = Vec::with_capacity(key_columns.len());
            for col in &key_columns {
                let v = col.get(row);
                if v.is_null() {
                    continue 'rows; // null group keys are dropped
                }
                key.push(v.clone());
            }
            groups.entry(GroupKey(key)).or_default().push(row);
        }

        let group_count = groups.len();
        let mut key_out: Vec<Vec<Value>> = vec![Vec::with_capacity(group_count); self.group_by.len()];
        let mut agg_out: Vec<Vec<Value>> =
            vec![Vec::with_capacity(group_count); self.aggregations.len()];

        for (key, rows) in &groups {
            for (slot, v) in key_out.iter_mut().zip(key.0.iter()) {
                slot.push(v.clone());
            }
            for (slot, (col, op, _)) in agg_out.iter_mut().zip(self.aggregations.iter()) {
                let column = table
                    .column(col)
                    .unwrap_or_else(|| unreachable!("checked above"));
                slot.push(reduce(column, rows, *op));
            }
        }

        let mut columns = Vec::with_capacity(self.group_by.len() + self.aggregations.len());
        for (name, values) in self.group_by.iter().zip(key_out) {
            columns.push(Column::new(name.clone(), values));
        }
        for ((_, _, alias), values) in self.aggregations.iter().zip(agg_out) {
            columns.push(Column::new(alias.clone(), values));
        }

        let result = Table::new(columns)?;
        Ok(NodeOutput::table(result).with_meta("unique_groups", group_count))
    }
}

fn reduce(column: &Column, rows: &[usize], op: AggOp) -> Value {
    let non_null = || rows.iter().map(|&r| column.get(r)).filter(|v| !v.is_null());

    match op {
        AggOp::Count => Value::Int(non_null().count() as i64),
        AggOp::First => non_null().next().cloned().unwrap_or(Value::Null),
        AggOp::Last => non_null().last().cloned().unwrap_or(Value::Null),
        AggOp::Min => non_null()
            .min_by(|a, b| a.total_cmp(b))
            .cloned()
            .unwrap_or(Value::Null),
        AggOp::Max => non_null()
            .max_by(|a, b| a.total_cmp(b))
            .cloned()
            .unwrap_or(Value::Null),
        AggOp::Sum => {
            // Integer columns keep an integer sum; anything float promotes.
            let mut int_sum: i64 = 0;
            let mut float_sum = 0.0;
            let mut any_float = false;
            for v in non_null() {
                match v {
                    Value::Int(i) => {
                        int_sum = int_sum.wrapping_add(*i);
                        float_sum += *i as f64;
                    }
                    Value::Float(f) => {
                        any_float = true;
                        float_sum += f;
                    }
                    _ => return Value::Null,
                }
            }
            if any_float {
                Value::float(float_sum)
            } else {
                Value::Int(int_sum)
            }
        }
        AggOp::Mean => {
            let nums: Vec<f64> = non_null().filter_map(Value::as_f64).collect();
            if nums.is_empty() {
                Value::Null
            } else {
                Value::float(nums.iter().sum::<f64>() / nums.len() as f64)
            }
        }
        AggOp::Std | AggOp::Var => {
            // Sample statistics: at least two observations.
            let nums: Vec<f64> = non_null().filter_map(Value::as_f64).collect();
            if nums.len() < 2 {
                return Value::Null;
            }
            let mean = nums.iter().sum::<f64>() / nums.len() as f64;
            let var = nums.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
                / (nums.len() - 1) as f64;
            match op {
                AggOp::Var => Value::float(var),
                _ => Value::float(var.sqrt()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store::MemTableStore;

    fn run(node: &dyn Node, inputs: Vec<Table>) -> Result<NodeOutput, NodeError> {
        let store = MemTableStore::new();
        node.execute(inputs, &NodeContext { store: &store })
    }

    fn left() -> Table {
        Table::new(vec![
            Column::new("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Column::new(
                "name",
                vec![
                    Value::Str("Alice".into()),
                    Value::Str("Bob".into()),
                    Value::Str("Charlie".into()),
                ],
            ),
        ])
        .unwrap()
    }

    fn right() -> Table {
        Table::new(vec![
            Column::new(
                "user_id",
                vec![Value::Int(2), Value::Int(3), Value::Int(4)],
            ),
            Column::new(
                "score",
                vec![Value::Int(85), Value::Int(90), Value::Int(75)],
            ),
        ])
        .unwrap()
    }

    fn join(config: serde_json::Value) -> JoinNode {
        JoinNode::from_config(&config).unwrap()
    }

    #[test]
    fn inner_join_keeps_matches_only() {
        let node = join(json!({ "leftKey": "id", "rightKey": "user_id" }));
        let out = run(&node, vec![left(), right()]).unwrap().data.unwrap();

        assert_eq!(out.num_rows(), 2);
        assert_eq!(out.column_names(), vec!["id", "name", "user_id", "score"]);
        assert_eq!(
            out.column("name").unwrap().values(),
            &[Value::Str("Bob".into()), Value::Str("Charlie".into())]
        );
        assert_eq!(
            out.column("score").unwrap().values(),
            &[Value::Int(85), Value::Int(90)]
        );
    }

    #[test]
    fn left_join_null_fills_unmatched() {
        let node = join(json!({ "leftKey": "id", "rightKey": "user_id", "how": "left" }));
        let out = run(&node, vec![left(), right()]).unwrap().data.unwrap();

        assert_eq!(out.num_rows(), 3);
        // Alice has no match; her score is NULL.
        assert_eq!(out.column("score").unwrap().values()[0], Value::Null);
        assert_eq!(out.column("name").unwrap().values()[0], Value::Str("Alice".into()));
    }

    #[test]
    fn right_join_orders_by_right_appearance() {
        let node = join(json!({ "leftKey": "id", "rightKey": "user_id", "how": "right" }));
        let out = run(&node, vec![left(), right()]).unwrap().data.unwrap();

        assert_eq!(out.num_rows(), 3);
        assert_eq!(
            out.column("user_id").unwrap().values(),
            &[Value::Int(2), Value::Int(3), Value::Int(4)]
        );
        // id 4 has no left match.
        assert_eq!(out.column("name").unwrap().values()[2], Value::Null);
    }

    #[test]
    fn outer_join_appends_right_only_rows() {
        let node = join(json!({ "leftKey": "id", "rightKey": "user_id", "how": "outer" }));
        let out = run(&node, vec![left(), right()]).unwrap().data.unwrap();

        assert_eq!(out.num_rows(), 4);
        // Left rows first (1, 2, 3), then unmatched right (user_id 4).
        assert_eq!(out.column("id").unwrap().values()[3], Value::Null);
        assert_eq!(out.column("user_id").unwrap().values()[3], Value::Int(4));
    }

    #[test]
    fn shared_key_name_produces_single_column() {
        let right = Table::new(vec![
            Column::new("id", vec![Value::Int(2), Value::Int(4)]),
            Column::new("score", vec![Value::Int(85), Value::Int(75)]),
        ])
        .unwrap();
        let node = join(json!({ "leftKey": "id", "rightKey": "id", "how": "outer" }));
        let out = run(&node, vec![left(), right]).unwrap().data.unwrap();

        assert_eq!(out.column_names(), vec!["id", "name", "score"]);
        // The right-only row still carries its key value.
        assert_eq!(out.column("id").unwrap().values()[3], Value::Int(4));
    }

    #[test]
    fn colliding_non_key_columns_get_suffixes() {
        let l = Table::new(vec![
            Column::new("id", vec![Value::Int(1)]),
            Column::new("v", vec![Value::Int(10)]),
        ])
        .unwrap();
        let r = Table::new(vec![
            Column::new("rid", vec![Value::Int(1)]),
            Column::new("v", vec![Value::Int(20)]),
        ])
        .unwrap();
        let node = join(json!({ "leftKey": "id", "rightKey": "rid" }));
        let out = run(&node, vec![l, r]).unwrap().data.unwrap();
        assert_eq!(out.column_names(), vec!["id", "v_left", "rid", "v_right"]);
    }

    #[test]
    fn join_requires_two_inputs() {
        let node = join(json!({ "leftKey": "id", "rightKey": "user_id" }));
        let err = run(&node, vec![left()]).unwrap_err();
        assert_eq!(err.to_string(), "Join requires 2 inputs, got 1");
    }

    #[test]
    fn join_missing_key_reports_available_columns() {
        let node = join(json!({ "leftKey": "ghost", "rightKey": "user_id" }));
        let err = run(&node, vec![left(), right()]).unwrap_err();
        assert!(err.to_string().contains("Left key 'ghost' not found"));
        assert!(err.to_string().contains("id, name"));
    }

    #[test]
    fn join_null_keys_match_each_other() {
        let l = Table::new(vec![Column::new("k", vec![Value::Null, Value::Int(1)])]).unwrap();
        let r = Table::new(vec![
            Column::new("rk", vec![Value::Null]),
            Column::new("v", vec![Value::Int(7)]),
        ])
        .unwrap();
        let node = join(json!({ "leftKey": "k", "rightKey": "rk" }));
        let out = run(&node, vec![l, r]).unwrap().data.unwrap();
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.column("v").unwrap().values()[0], Value::Int(7));
    }

    fn sales() -> Table {
        Table::new(vec![
            Column::new(
                "dept",
                vec![
                    Value::Str("Sales".into()),
                    Value::Str("Sales".into()),
                    Value::Str("Eng".into()),
                ],
            ),
            Column::new(
                "emp",
                vec![
                    Value::Str("Alice".into()),
                    Value::Str("Bob".into()),
                    Value::Str("Charlie".into()),
                ],
            ),
            Column::new(
                "salary",
                vec![Value::Int(50000), Value::Int(55000), Value::Int(70000)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn aggregate_sum_and_count() {
        let node = AggregateNode::from_config(&json!({
            "groupBy": ["dept"],
            "aggregations": [
                { "col": "salary", "op": "sum", "as": "total" },
                { "col": "emp", "op": "count", "as": "headcount" }
            ]
        }))
        .unwrap();
        let out = run(&node, vec![sales()]).unwrap().data.unwrap();

        assert_eq!(out.num_rows(), 2);
        assert_eq!(out.column_names(), vec!["dept", "total", "headcount"]);
        // Ascending group key order: Eng before Sales.
        assert_eq!(
            out.column("dept").unwrap().values(),
            &[Value::Str("Eng".into()), Value::Str("Sales".into())]
        );
        assert_eq!(
            out.column("total").unwrap().values(),
            &[Value::Int(70000), Value::Int(105000)]
        );
        assert_eq!(
            out.column("headcount").unwrap().values(),
            &[Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn count_skips_nulls() {
        let t = Table::new(vec![
            Column::new(
                "g",
                vec![Value::Str("a".into()), Value::Str("a".into())],
            ),
            Column::new("x", vec![Value::Int(1), Value::Null]),
        ])
        .unwrap();
        let node = AggregateNode::from_config(&json!({
            "groupBy": ["g"],
            "aggregations": [{ "col": "x", "op": "count", "as": "n" }]
        }))
        .unwrap();
        let out = run(&node, vec![t]).unwrap().data.unwrap();
        assert_eq!(out.column("n").unwrap().values(), &[Value::Int(1)]);
    }

    #[test]
    fn null_group_keys_are_dropped() {
        let t = Table::new(vec![
            Column::new("g", vec![Value::Null, Value::Str("a".into())]),
            Column::new("x", vec![Value::Int(1), Value::Int(2)]),
        ])
        .unwrap();
        let node = AggregateNode::from_config(&json!({
            "groupBy": ["g"],
            "aggregations": [{ "col": "x", "op": "sum", "as": "s" }]
        }))
        .unwrap();
        let out = run(&node, vec![t]).unwrap().data.unwrap();
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.column("s").unwrap().values(), &[Value::Int(2)]);
    }

    #[test]
    fn mean_std_first_last() {
        let t = Table::new(vec![
            Column::new(
                "g",
                vec![
                    Value::Str("a".into()),
                    Value::Str("a".into()),
                    Value::Str("a".into()),
                ],
            ),
            Column::new("x", vec![Value::Null, Value::Int(2), Value::Int(4)]),
        ])
        .unwrap();
        let node = AggregateNode::from_config(&json!({
            "groupBy": ["g"],
            "aggregations": [
                { "col": "x", "op": "mean", "as": "m" },
                { "col": "x", "op": "first", "as": "f" },
                { "col": "x", "op": "last", "as": "l" },
                { "col": "x", "op": "var", "as": "v" }
            ]
        }))
        .unwrap();
        let out = run(&node, vec![t]).unwrap().data.unwrap();
        assert_eq!(out.column("m").unwrap().values(), &[Value::Float(3.0)]);
        // first is the first non-null observation
        assert_eq!(out.column("f").unwrap().values(), &[Value::Int(2)]);
        assert_eq!(out.column("l").unwrap().values(), &[Value::Int(4)]);
        // sample variance of {2, 4}
        assert_eq!(out.column("v").unwrap().values(), &[Value::Float(2.0)]);
    }

    #[test]
    fn default_alias_is_col_op() {
        let node = AggregateNode::from_config(&json!({
            "groupBy": ["dept"],
            "aggregations": [{ "col": "salary", "op": "max" }]
        }))
        .unwrap();
        let out = run(&node, vec![sales()]).unwrap().data.unwrap();
        assert!(out.has_column("salary_max"));
    }

    #[test]
    fn aggregate_row_bound() {
        let node = AggregateNode::from_config(&json!({
            "groupBy": ["dept"],
            "aggregations": [{ "col": "salary", "op": "sum", "as": "s" }]
        }))
        .unwrap();
        let out = run(&node, vec![sales()]).unwrap().data.unwrap();
        assert!(out.num_rows() <= 2); // distinct depts
    }

    #[test]
    fn aggregate_config_validation() {
        assert!(AggregateNode::from_config(&json!({ "aggregations": [] })).is_err());
        assert!(AggregateNode::from_config(&json!({ "groupBy": ["g"] })).is_err());
        // Unsupported op is rejected at build.
        assert!(AggregateNode::from_config(&json!({
            "groupBy": ["g"],
            "aggregations": [{ "col": "x", "op": "median", "as": "m" }]
        }))
        .is_err());
    }

    #[test]
    fn aggregate_missing_columns_fail() {
        let node = AggregateNode::from_config(&json!({
            "groupBy": ["ghost"],
            "aggregations": [{ "col": "salary", "op": "sum", "as": "s" }]
        }))
        .unwrap();
        let err = run(&node, vec![sales()]).unwrap_err();
        assert_eq!(err.to_string(), "Group columns not found: ghost");

        let node = AggregateNode::from_config(&json!({
            "groupBy": ["dept"],
            "aggregations": [{ "col": "ghost", "op": "sum", "as": "s" }]
        }))
        .unwrap();
        let err = run(&node, vec![sales()]).unwrap_err();
        assert_eq!(err.to_string(), "Aggregation column not found: ghost");
    }
}
