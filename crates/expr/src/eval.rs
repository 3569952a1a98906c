//! Columnar AST evaluator.
//!
//! Expressions evaluate against a [`Table`] to either a scalar (broadcast on
//! demand) or a column of the table's row count. NULL propagates through
//! arithmetic and comparison; logical operators use three-valued truth
//! tables, and a NULL filter mask entry excludes the row.

use table::{Table, Value};

use crate::error::ExpressionError;
use crate::parser::{BinOp, Expr, UnaryOp};

#[derive(Debug, Clone)]
enum Evaluated {
    Scalar(Value),
    Column(Vec<Value>),
    /// Literal list, only usable as the right side of `in` / `not in`.
    List(Vec<Value>),
}

impl Evaluated {
    fn into_rows(self, n: usize) -> Result<Vec<Value>, ExpressionError> {
        match self {
            Evaluated::Scalar(v) => Ok(vec![v; n]),
            Evaluated::Column(c) => Ok(c),
            Evaluated::List(_) => Err(ExpressionError::Type(
                "a list literal is only valid after 'in'".into(),
            )),
        }
    }
}

/// Evaluate `expr` to one value per row of `table`.
pub fn eval_to_column(table: &Table, expr: &Expr) -> Result<Vec<Value>, ExpressionError> {
    eval(table, expr)?.into_rows(table.num_rows())
}

/// Keep exactly the rows where `expr` is true. NULL and false both drop the
/// row; a non-boolean result is a type error.
pub fn eval_filter_mask(table: &Table, expr: &Expr) -> Result<Vec<usize>, ExpressionError> {
    let mask = eval_to_column(table, expr)?;
    let mut kept = Vec::new();
    for (i, v) in mask.iter().enumerate() {
        match v {
            Value::Bool(true) => kept.push(i),
            Value::Bool(false) | Value::Null => {}
            other => {
                return Err(ExpressionError::Type(format!(
                    "filter expression must evaluate to booleans, got {}",
                    other.kind()
                )))
            }
        }
    }
    Ok(kept)
}

fn eval(table: &Table, expr: &Expr) -> Result<Evaluated, ExpressionError> {
    match expr {
        Expr::Int(n) => Ok(Evaluated::Scalar(Value::Int(*n))),
        Expr::Float(f) => Ok(Evaluated::Scalar(Value::float(*f))),
        Expr::Str(s) => Ok(Evaluated::Scalar(Value::Str(s.clone()))),
        Expr::Bool(b) => Ok(Evaluated::Scalar(Value::Bool(*b))),
        Expr::Null => Ok(Evaluated::Scalar(Value::Null)),

        Expr::Column(name) => match table.column(name) {
            Some(col) => Ok(Evaluated::Column(col.values().to_vec())),
            None => Err(ExpressionError::UnknownColumn(name.clone())),
        },

        Expr::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match eval(table, item)? {
                    Evaluated::Scalar(v) => values.push(v),
                    _ => {
                        return Err(ExpressionError::Type(
                            "list literals may only contain scalar values".into(),
                        ))
                    }
                }
            }
            Ok(Evaluated::List(values))
        }

        Expr::Unary(op, inner) => {
            let inner = eval(table, inner)?;
            unary(op, inner)
        }

        Expr::Binary(BinOp::In, lhs, rhs) => membership(table, lhs, rhs, false),
        Expr::Binary(BinOp::NotIn, lhs, rhs) => membership(table, lhs, rhs, true),

        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(table, lhs)?;
            let rhs = eval(table, rhs)?;
            binary(table.num_rows(), *op, lhs, rhs)
        }

        Expr::Call(name, args) => call(table, name, args),
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn unary(op: &UnaryOp, operand: Evaluated) -> Result<Evaluated, ExpressionError> {
    let apply = |v: &Value| -> Result<Value, ExpressionError> {
        match (op, v) {
            (_, Value::Null) => Ok(Value::Null),
            (UnaryOp::Neg, Value::Int(i)) => Ok(Value::Int(-i)),
            (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
            (UnaryOp::Pos, Value::Int(i)) => Ok(Value::Int(*i)),
            (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Not, other) => Err(ExpressionError::Type(format!(
                "'not' requires a boolean, got {}",
                other.kind()
            ))),
            (_, other) => Err(ExpressionError::Type(format!(
                "unary sign requires a number, got {}",
                other.kind()
            ))),
        }
    };
    match operand {
        Evaluated::Scalar(v) => Ok(Evaluated::Scalar(apply(&v)?)),
        Evaluated::Column(c) => Ok(Evaluated::Column(
            c.iter().map(apply).collect::<Result<_, _>>()?,
        )),
        Evaluated::List(_) => Err(ExpressionError::Type(
            "a list literal is only valid after 'in'".into(),
        )),
    }
}

fn binary(
    n: usize,
    op: BinOp,
    lhs: Evaluated,
    rhs: Evaluated,
) -> Result<Evaluated, ExpressionError> {
    // Scalar op scalar stays scalar so constant subexpressions don't
    // materialize columns.
    if let (Evaluated::Scalar(a), Evaluated::Scalar(b)) = (&lhs, &rhs) {
        return Ok(Evaluated::Scalar(binary_value(op, a, b)?));
    }
    let lhs = lhs.into_rows(n)?;
    let rhs = rhs.into_rows(n)?;
    let out: Result<Vec<Value>, ExpressionError> = lhs
        .iter()
        .zip(rhs.iter())
        .map(|(a, b)| binary_value(op, a, b))
        .collect();
    Ok(Evaluated::Column(out?))
}

fn binary_value(op: BinOp, a: &Value, b: &Value) -> Result<Value, ExpressionError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod
        | BinOp::Pow => arithmetic(op, a, b),
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            comparison(op, a, b)
        }
        BinOp::And | BinOp::Or => logical(op, a, b),
        BinOp::In | BinOp::NotIn => unreachable!("membership handled separately"),
    }
}

fn arithmetic(op: BinOp, a: &Value, b: &Value) -> Result<Value, ExpressionError> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }

    // String concatenation is the one non-numeric case.
    if op == BinOp::Add {
        if let (Value::Str(x), Value::Str(y)) = (a, b) {
            return Ok(Value::Str(format!("{x}{y}")));
        }
    }

    match (a, b) {
        (Value::Int(x), Value::Int(y)) => int_arithmetic(op, *x, *y),
        _ => {
            let (x, y) = match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    return Err(ExpressionError::Type(format!(
                        "arithmetic requires numbers, got {} and {}",
                        a.kind(),
                        b.kind()
                    )))
                }
            };
            float_arithmetic(op, x, y)
        }
    }
}

fn int_arithmetic(op: BinOp, x: i64, y: i64) -> Result<Value, ExpressionError> {
    let overflow = || ExpressionError::Eval("integer overflow".into());
    match op {
        BinOp::Add => x.checked_add(y).map(Value::Int).ok_or_else(overflow),
        BinOp::Sub => x.checked_sub(y).map(Value::Int).ok_or_else(overflow),
        BinOp::Mul => x.checked_mul(y).map(Value::Int).ok_or_else(overflow),
        // True division always yields float.
        BinOp::Div => float_arithmetic(op, x as f64, y as f64),
        BinOp::FloorDiv => {
            if y == 0 {
                return Err(ExpressionError::Eval("integer division by zero".into()));
            }
            let q = x / y;
            let r = x % y;
            // Round toward negative infinity, like Python's //.
            Ok(Value::Int(if r != 0 && (r < 0) != (y < 0) { q - 1 } else { q }))
        }
        BinOp::Mod => {
            if y == 0 {
                return Err(ExpressionError::Eval("integer modulo by zero".into()));
            }
            let r = x % y;
            // Remainder takes the sign of the divisor.
            Ok(Value::Int(if r != 0 && (r < 0) != (y < 0) { r + y } else { r }))
        }
        BinOp::Pow => {
            if y >= 0 {
                let exp = u32::try_from(y).map_err(|_| overflow())?;
                x.checked_pow(exp).map(Value::Int).ok_or_else(overflow)
            } else {
                Ok(Value::float((x as f64).powi(y as i32)))
            }
        }
        _ => unreachable!(),
    }
}

fn float_arithmetic(op: BinOp, x: f64, y: f64) -> Result<Value, ExpressionError> {
    match op {
        BinOp::Add => Ok(Value::float(x + y)),
        BinOp::Sub => Ok(Value::float(x - y)),
        BinOp::Mul => Ok(Value::float(x * y)),
        // IEEE: x/0 is +-inf, 0/0 is NaN which surfaces as NULL.
        BinOp::Div => Ok(Value::float(x / y)),
        BinOp::FloorDiv => {
            if y == 0.0 {
                return Err(ExpressionError::Eval("float floor-division by zero".into()));
            }
            Ok(Value::float((x / y).floor()))
        }
        BinOp::Mod => {
            if y == 0.0 {
                return Err(ExpressionError::Eval("float modulo by zero".into()));
            }
            Ok(Value::float(x - y * (x / y).floor()))
        }
        BinOp::Pow => Ok(Value::float(x.powf(y))),
        _ => unreachable!(),
    }
}

fn comparison(op: BinOp, a: &Value, b: &Value) -> Result<Value, ExpressionError> {
    use std::cmp::Ordering;

    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }

    // Booleans participate as 0/1, so bool == int comparisons behave.
    let num = |v: &Value| -> Option<f64> {
        match v {
            Value::Bool(b) => Some(*b as i64 as f64),
            other => other.as_f64(),
        }
    };

    let ord: Option<Ordering> = match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => match (num(a), num(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };

    match ord {
        Some(ord) => Ok(Value::Bool(match op {
            BinOp::Eq => ord == Ordering::Equal,
            BinOp::Ne => ord != Ordering::Equal,
            BinOp::Lt => ord == Ordering::Less,
            BinOp::Le => ord != Ordering::Greater,
            BinOp::Gt => ord == Ordering::Greater,
            BinOp::Ge => ord != Ordering::Less,
            _ => unreachable!(),
        })),
        // Cross-kind: equality is decidable (always unequal), ordering is not.
        None => match op {
            BinOp::Eq => Ok(Value::Bool(false)),
            BinOp::Ne => Ok(Value::Bool(true)),
            _ => Err(ExpressionError::Type(format!(
                "cannot order {} against {}",
                a.kind(),
                b.kind()
            ))),
        },
    }
}

fn logical(op: BinOp, a: &Value, b: &Value) -> Result<Value, ExpressionError> {
    let truth = |v: &Value| -> Result<Option<bool>, ExpressionError> {
        match v {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            other => Err(ExpressionError::Type(format!(
                "logical operators require booleans, got {}",
                other.kind()
            ))),
        }
    };
    let (x, y) = (truth(a)?, truth(b)?);
    // Three-valued truth tables.
    let out = match op {
        BinOp::And => match (x, y) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        BinOp::Or => match (x, y) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        _ => unreachable!(),
    };
    Ok(out.map(Value::Bool).unwrap_or(Value::Null))
}

fn membership(
    table: &Table,
    lhs: &Expr,
    rhs: &Expr,
    negate: bool,
) -> Result<Evaluated, ExpressionError> {
    let haystack: Vec<Value> = match eval(table, rhs)? {
        Evaluated::List(items) => items,
        Evaluated::Column(values) => values,
        Evaluated::Scalar(_) => {
            return Err(ExpressionError::Type(
                "'in' requires a list or column on the right".into(),
            ))
        }
    };

    let contains = |v: &Value| -> Value {
        if v.is_null() {
            return Value::Null;
        }
        let found = haystack
            .iter()
            .any(|h| !h.is_null() && matches!(comparison(BinOp::Eq, v, h), Ok(Value::Bool(true))));
        Value::Bool(found != negate)
    };

    match eval(table, lhs)? {
        Evaluated::Scalar(v) => Ok(Evaluated::Scalar(contains(&v))),
        Evaluated::Column(c) => Ok(Evaluated::Column(c.iter().map(contains).collect())),
        Evaluated::List(_) => Err(ExpressionError::Type(
            "a list literal is only valid after 'in'".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Built-in functions
// ---------------------------------------------------------------------------

fn call(table: &Table, name: &str, args: &[Expr]) -> Result<Evaluated, ExpressionError> {
    let n = table.num_rows();

    match name {
        "abs" | "round" | "floor" | "ceil" | "sqrt" | "log" | "log10" | "exp" | "sin" | "cos"
        | "tan" => {
            let arg = eval(table, &args[0])?.into_rows(n)?;
            let out: Result<Vec<Value>, _> = arg.iter().map(|v| math1(name, v)).collect();
            Ok(Evaluated::Column(out?))
        }
        "min" | "max" => {
            let a = eval(table, &args[0])?.into_rows(n)?;
            let b = eval(table, &args[1])?.into_rows(n)?;
            let pick_max = name == "max";
            let out: Result<Vec<Value>, _> = a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| pairwise_extreme(x, y, pick_max))
                .collect();
            Ok(Evaluated::Column(out?))
        }
        "lower" | "upper" | "strip" | "len" => {
            let arg = eval(table, &args[0])?.into_rows(n)?;
            let out: Result<Vec<Value>, _> = arg.iter().map(|v| string1(name, v)).collect();
            Ok(Evaluated::Column(out?))
        }
        "contains" => {
            let hay = eval(table, &args[0])?.into_rows(n)?;
            let needle = eval(table, &args[1])?.into_rows(n)?;
            let out: Result<Vec<Value>, _> = hay
                .iter()
                .zip(needle.iter())
                .map(|(s, pat)| match (s, pat) {
                    // Substring test treats NULL as "does not contain".
                    (Value::Null, _) | (_, Value::Null) => Ok(Value::Bool(false)),
                    (Value::Str(s), Value::Str(pat)) => Ok(Value::Bool(s.contains(pat.as_str()))),
                    (s, p) => Err(ExpressionError::Type(format!(
                        "contains() requires strings, got {} and {}",
                        s.kind(),
                        p.kind()
                    ))),
                })
                .collect();
            Ok(Evaluated::Column(out?))
        }
        other => Err(ExpressionError::UnknownColumn(other.to_string())),
    }
}

fn math1(name: &str, v: &Value) -> Result<Value, ExpressionError> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    // abs and round keep integers integral.
    if let Value::Int(i) = v {
        match name {
            "abs" => return Ok(Value::Int(i.abs())),
            "round" => return Ok(Value::Int(*i)),
            _ => {}
        }
    }

    let Some(x) = v.as_f64() else {
        return Err(ExpressionError::Type(format!(
            "{name}() requires a number, got {}",
            v.kind()
        )));
    };
    let out = match name {
        "abs" => x.abs(),
        "round" => x.round_ties_even(),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "sqrt" => x.sqrt(),
        "log" => x.ln(),
        "log10" => x.log10(),
        "exp" => x.exp(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        _ => unreachable!(),
    };
    // Domain errors (sqrt of a negative, log of zero) surface as NULL.
    Ok(Value::float(out))
}

fn pairwise_extreme(a: &Value, b: &Value, pick_max: bool) -> Result<Value, ExpressionError> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    let comparable = matches!(
        (a, b),
        (Value::Str(_), Value::Str(_))
            | (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_))
    );
    if !comparable {
        return Err(ExpressionError::Type(format!(
            "min()/max() require matching kinds, got {} and {}",
            a.kind(),
            b.kind()
        )));
    }
    let a_wins = a.total_cmp(b) == if pick_max {
        std::cmp::Ordering::Greater
    } else {
        std::cmp::Ordering::Less
    };
    Ok(if a_wins || a.total_cmp(b) == std::cmp::Ordering::Equal {
        a.clone()
    } else {
        b.clone()
    })
}

fn string1(name: &str, v: &Value) -> Result<Value, ExpressionError> {
    match v {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => Ok(match name {
            "lower" => Value::Str(s.to_lowercase()),
            "upper" => Value::Str(s.to_uppercase()),
            "strip" => Value::Str(s.trim().to_string()),
            "len" => Value::Int(s.chars().count() as i64),
            _ => unreachable!(),
        }),
        other => Err(ExpressionError::Type(format!(
            "{name}() requires a string, got {}",
            other.kind()
        ))),
    }
}
