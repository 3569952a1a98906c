//! The workflow document: the in-memory form of the JSON a caller submits.
//!
//! Both camelCase (`fromNodeId`) and snake_case (`from_node_id`) field
//! spellings are accepted on input; camelCase is emitted.

use serde::{Deserialize, Serialize};

/// A single step in the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique identifier within this workflow (referenced by edges).
    pub id: String,
    /// Maps to a registered node kind.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Untyped configuration, interpreted by the node at graph build.
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Directed edge carrying a table from one node's output port to another
/// node's input port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "fromNodeId", alias = "from_node_id")]
    pub from_node_id: String,
    #[serde(rename = "toNodeId", alias = "to_node_id")]
    pub to_node_id: String,
    #[serde(
        rename = "fromPort",
        alias = "from_port",
        default = "default_from_port"
    )]
    pub from_port: String,
    #[serde(rename = "toPort", alias = "to_port", default = "default_to_port")]
    pub to_port: String,
}

fn default_from_port() -> String {
    "out".to_string()
}

fn default_to_port() -> String {
    "in".to_string()
}

/// A complete workflow definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    pub fn new(nodes: Vec<NodeDefinition>, edges: Vec<Edge>) -> Workflow {
        Workflow { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_camel_case_fields() {
        let wf: Workflow = serde_json::from_str(
            r#"{
                "nodes": [{ "id": "a", "type": "ReadCSV", "config": { "upload_id": "u" } }],
                "edges": [{ "fromNodeId": "a", "toNodeId": "b", "toPort": "in_0" }]
            }"#,
        )
        .unwrap();
        assert_eq!(wf.edges[0].from_node_id, "a");
        assert_eq!(wf.edges[0].from_port, "out");
        assert_eq!(wf.edges[0].to_port, "in_0");
    }

    #[test]
    fn accepts_snake_case_fields() {
        let wf: Workflow = serde_json::from_str(
            r#"{
                "nodes": [{ "id": "a", "type": "Filter" }],
                "edges": [{ "from_node_id": "a", "to_node_id": "a", "from_port": "out" }]
            }"#,
        )
        .unwrap();
        assert_eq!(wf.edges[0].to_node_id, "a");
        assert_eq!(wf.nodes[0].config, serde_json::Value::Null);
    }
}
