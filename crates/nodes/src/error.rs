//! Node-level error type.
//!
//! Every variant becomes a failed `NodeResult` on the offending node; none
//! of them abort the surrounding run. The variant names the failure tier:
//! config problems are caught at graph build, the rest during execute.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    /// Missing or invalid configuration field.
    #[error("{0}")]
    Config(String),

    /// A referenced column is absent from the input.
    #[error("{0}")]
    Schema(String),

    /// Expression parse, safety, or evaluation failure.
    #[error(transparent)]
    Expression(#[from] expr::ExpressionError),

    /// Wrong number of inputs for the node's contract.
    #[error("{0}")]
    Input(String),

    /// Source or sink failure in ReadCSV / Output.
    #[error("{0}")]
    Io(String),

    /// Runtime failure inside an operator.
    #[error("{0}")]
    Compute(String),
}

impl From<table::TableError> for NodeError {
    fn from(e: table::TableError) -> Self {
        NodeError::Compute(e.to_string())
    }
}
