//! `expr` crate — the safe expression sublanguage for Filter and Formula.
//!
//! Untrusted expression text goes through four stages: a blocklist safety
//! pass, text-level normalization (`&&`/`||`/`!` become keywords), a
//! recursive-descent parse into an AST, and columnar evaluation against a
//! [`Table`]. User text is never handed to a host-language interpreter.

pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod validate;

pub use error::ExpressionError;
pub use parser::Expr;
pub use validate::validate;

use table::{Column, Table};

/// A validated, parsed expression ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct Program {
    ast: Expr,
    source: String,
}

impl Program {
    /// Validate, normalize, and parse an expression.
    ///
    /// # Errors
    /// [`ExpressionError`] on an empty expression, a blocklist hit, or a
    /// syntax error.
    pub fn compile(expression: &str) -> Result<Program, ExpressionError> {
        validate::validate(expression)?;
        let normalized = validate::normalize(expression);
        let ast = parser::parse(&normalized)?;
        Ok(Program {
            ast,
            source: expression.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Keep exactly the rows where the expression is true.
    pub fn filter(&self, table: &Table) -> Result<Table, ExpressionError> {
        let kept = eval::eval_filter_mask(table, &self.ast)?;
        Ok(table.take_rows(&kept))
    }

    /// Append the expression's result as `new_col`, replacing an existing
    /// column of that name. Row count and the other columns are unchanged.
    pub fn formula(&self, table: &Table, new_col: &str) -> Result<Table, ExpressionError> {
        let values = eval::eval_to_column(table, &self.ast)?;
        table
            .with_column(Column::new(new_col, values))
            .map_err(|e| ExpressionError::Eval(e.to_string()))
    }
}

/// One-shot form of [`Program::filter`].
pub fn evaluate_filter(table: &Table, expression: &str) -> Result<Table, ExpressionError> {
    Program::compile(expression)?.filter(table)
}

/// One-shot form of [`Program::formula`].
pub fn evaluate_formula(
    table: &Table,
    expression: &str,
    new_col: &str,
) -> Result<Table, ExpressionError> {
    Program::compile(expression)?.formula(table, new_col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use table::Value;

    fn people() -> Table {
        Table::new(vec![
            Column::new(
                "age",
                vec![Value::Int(25), Value::Int(35), Value::Int(45)],
            ),
            Column::new(
                "dept",
                vec![
                    Value::Str("Sales".into()),
                    Value::Str("Eng".into()),
                    Value::Str("Sales".into()),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn filter_keeps_matching_rows() {
        let out = evaluate_filter(&people(), "age > 30").unwrap();
        assert_eq!(out.num_rows(), 2);
        assert_eq!(out.column("age").unwrap().values()[0], Value::Int(35));
    }

    #[test]
    fn filter_with_c_style_operators() {
        let out = evaluate_filter(&people(), "age > 30 && dept == 'Sales'").unwrap();
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.column("age").unwrap().values()[0], Value::Int(45));
    }

    #[test]
    fn filter_monotonicity_of_conjunction() {
        let a = evaluate_filter(&people(), "age > 30").unwrap();
        let ab = evaluate_filter(&people(), "age > 30 and dept == 'Sales'").unwrap();
        assert!(ab.num_rows() <= a.num_rows());
    }

    #[test]
    fn formula_appends_column() {
        let out = evaluate_formula(&people(), "age * 2", "double_age").unwrap();
        assert_eq!(out.column_names(), vec!["age", "dept", "double_age"]);
        assert_eq!(
            out.column("double_age").unwrap().values(),
            &[Value::Int(50), Value::Int(70), Value::Int(90)]
        );
    }

    #[test]
    fn formula_replaces_existing_column() {
        let out = evaluate_formula(&people(), "age + 1", "age").unwrap();
        assert_eq!(out.num_columns(), 2);
        assert_eq!(out.column("age").unwrap().values()[0], Value::Int(26));
    }

    #[test]
    fn formula_broadcasts_scalars() {
        let out = evaluate_formula(&people(), "1.1", "rate").unwrap();
        assert_eq!(out.column("rate").unwrap().values().len(), 3);
        assert_eq!(out.column("rate").unwrap().values()[2], Value::Float(1.1));
    }

    #[test]
    fn hostile_input_is_rejected_before_evaluation() {
        let err = evaluate_formula(&people(), "__import__('os').system('rm -rf /')", "x")
            .unwrap_err();
        assert!(matches!(err, ExpressionError::Forbidden(_)));
        let err = evaluate_filter(&people(), "eval('1')").unwrap_err();
        assert!(matches!(err, ExpressionError::Forbidden(_)));
    }

    #[test]
    fn empty_expression_message() {
        let err = evaluate_filter(&people(), "  ").unwrap_err();
        assert_eq!(err.to_string(), "Expression cannot be empty");
    }

    #[test]
    fn inputs_are_never_mutated() {
        let table = people();
        let snapshot = table.clone();
        let _ = evaluate_filter(&table, "age > 30").unwrap();
        let _ = evaluate_formula(&table, "age * 2", "x").unwrap();
        assert_eq!(table, snapshot);
    }
}
