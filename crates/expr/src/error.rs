//! Error type shared by the validator, parser, and evaluator.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Expression cannot be empty")]
    Empty,

    /// The safety pass matched a forbidden pattern. The pattern is reported,
    /// never interpreted.
    #[error("Expression contains forbidden pattern: {0}")]
    Forbidden(String),

    #[error("Invalid expression syntax: {0}")]
    Syntax(String),

    #[error("Unknown column reference: '{0}'")]
    UnknownColumn(String),

    #[error("{name}() takes {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("type error: {0}")]
    Type(String),

    #[error("evaluation failed: {0}")]
    Eval(String),
}
