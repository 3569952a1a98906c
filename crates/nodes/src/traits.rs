//! The `Node` trait — the contract every operator must fulfil.

use serde_json::Value as Json;
use store::TableStore;
use table::Table;

use crate::NodeError;

/// Per-call context handed to every node during execution.
///
/// The table store is injected by the executor at run time; nodes never
/// reach for process-global paths.
pub struct NodeContext<'a> {
    pub store: &'a dyn TableStore,
}

/// What a successful node execution produced.
#[derive(Debug, Default)]
pub struct NodeOutput {
    /// The output table, if the node produces one for downstream consumers.
    pub data: Option<Table>,
    /// Free-form per-node metadata surfaced on the result record.
    pub metadata: serde_json::Map<String, Json>,
}

impl NodeOutput {
    pub fn table(table: Table) -> NodeOutput {
        NodeOutput {
            data: Some(table),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach one metadata entry, builder-style.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Json>) -> NodeOutput {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The core node trait.
///
/// A node is a pure function of its parsed config and its inputs: given the
/// same inputs it must produce the same output, and it must never mutate an
/// input table.
pub trait Node: Send + Sync {
    /// Run the operator over the gathered upstream tables.
    ///
    /// # Errors
    /// Any [`NodeError`]; the executor records it on this node's result and
    /// continues the run.
    fn execute(&self, inputs: Vec<Table>, ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError>;
}

/// Pull the single expected input, with the conventional message when the
/// upstream produced nothing.
pub(crate) fn single_input(mut inputs: Vec<Table>, what: &str) -> Result<Table, NodeError> {
    if inputs.is_empty() {
        return Err(NodeError::Input(format!("No input data to {what}")));
    }
    Ok(inputs.swap_remove(0))
}

/// Deserialize a node's config map, treating an absent config as empty.
pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(config: &Json) -> Result<T, NodeError> {
    let value = match config {
        Json::Null => Json::Object(serde_json::Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| NodeError::Config(e.to_string()))
}
