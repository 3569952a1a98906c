//! Engine-level error types.
//!
//! These are the only conditions that abort an entire `execute` call; every
//! other failure lands on an individual node's result record.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The workflow document contains no nodes.
    #[error("Workflow has no nodes")]
    EmptyWorkflow,

    /// Two or more nodes share the same ID.
    #[error("duplicate node ID: '{0}'")]
    DuplicateNodeId(String),

    /// A node references a kind the catalog doesn't know.
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// An edge references a node ID that doesn't exist in the workflow.
    #[error("Edge references unknown node: {node_id} ({side} side)")]
    UnknownNodeReference {
        node_id: String,
        side: &'static str,
    },

    /// Topological sort could not consume every node.
    #[error("Workflow contains a cycle")]
    CycleDetected,
}
