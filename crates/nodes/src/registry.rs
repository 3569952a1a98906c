//! Registry of node kinds and their catalog metadata.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::combine::{AggregateNode, JoinNode};
use crate::io::{OutputNode, ReadCsvNode};
use crate::transform::{FilterNode, FormulaNode, SelectNode, SortNode};
use crate::traits::Node;
use crate::NodeError;

type BuildFn = fn(&serde_json::Value) -> Result<Box<dyn Node>, NodeError>;

/// Static description of one node kind plus its constructor.
pub struct NodeDescriptor {
    pub node_type: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub input_count: usize,
    pub output_count: usize,
    /// Required destination port names, in positional order.
    pub input_ports: &'static [&'static str],
    build: BuildFn,
}

/// Catalog entry in its external (camelCase JSON) form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(rename = "type")]
    pub node_type: String,
    pub display_name: String,
    pub description: String,
    pub input_count: usize,
    pub output_count: usize,
    pub input_ports: Vec<String>,
}

impl NodeDescriptor {
    pub fn info(&self) -> NodeInfo {
        NodeInfo {
            node_type: self.node_type.to_string(),
            display_name: self.display_name.to_string(),
            description: self.description.to_string(),
            input_count: self.input_count,
            output_count: self.output_count,
            input_ports: self.input_ports.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Maps node `type` strings to descriptors. Iteration order is the type
/// name, so catalog listings are stable.
pub struct NodeRegistry {
    descriptors: BTreeMap<&'static str, NodeDescriptor>,
}

impl NodeRegistry {
    /// The eight built-in node kinds.
    pub fn builtin() -> NodeRegistry {
        let mut registry = NodeRegistry {
            descriptors: BTreeMap::new(),
        };
        registry.register(NodeDescriptor {
            node_type: "ReadCSV",
            display_name: "Read CSV",
            description: "Load data from a CSV file",
            input_count: 0,
            output_count: 1,
            input_ports: &[],
            build: |cfg| Ok(Box::new(ReadCsvNode::from_config(cfg)?)),
        });
        registry.register(NodeDescriptor {
            node_type: "Filter",
            display_name: "Filter",
            description: "Filter rows based on a condition",
            input_count: 1,
            output_count: 1,
            input_ports: &["in"],
            build: |cfg| Ok(Box::new(FilterNode::from_config(cfg)?)),
        });
        registry.register(NodeDescriptor {
            node_type: "Select",
            display_name: "Select Columns",
            description: "Choose which columns to keep",
            input_count: 1,
            output_count: 1,
            input_ports: &["in"],
            build: |cfg| Ok(Box::new(SelectNode::from_config(cfg)?)),
        });
        registry.register(NodeDescriptor {
            node_type: "Sort",
            display_name: "Sort",
            description: "Sort rows by column values",
            input_count: 1,
            output_count: 1,
            input_ports: &["in"],
            build: |cfg| Ok(Box::new(SortNode::from_config(cfg)?)),
        });
        registry.register(NodeDescriptor {
            node_type: "Formula",
            display_name: "Formula",
            description: "Create a calculated column",
            input_count: 1,
            output_count: 1,
            input_ports: &["in"],
            build: |cfg| Ok(Box::new(FormulaNode::from_config(cfg)?)),
        });
        registry.register(NodeDescriptor {
            node_type: "Join",
            display_name: "Join",
            description: "Combine two datasets based on matching keys (in_0 = left, in_1 = right)",
            input_count: 2,
            output_count: 1,
            input_ports: &["in_0", "in_1"],
            build: |cfg| Ok(Box::new(JoinNode::from_config(cfg)?)),
        });
        registry.register(NodeDescriptor {
            node_type: "Aggregate",
            display_name: "Aggregate",
            description: "Group data and calculate summaries",
            input_count: 1,
            output_count: 1,
            input_ports: &["in"],
            build: |cfg| Ok(Box::new(AggregateNode::from_config(cfg)?)),
        });
        registry.register(NodeDescriptor {
            node_type: "Output",
            display_name: "Output",
            description: "Export data as CSV for download",
            input_count: 1,
            output_count: 0,
            input_ports: &["in"],
            build: |cfg| Ok(Box::new(OutputNode::from_config(cfg)?)),
        });
        registry
    }

    fn register(&mut self, descriptor: NodeDescriptor) {
        self.descriptors.insert(descriptor.node_type, descriptor);
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.descriptors.contains_key(node_type)
    }

    /// Instantiate a node of the given kind from its config. `None` means
    /// the kind itself is unknown; `Some(Err(..))` a config failure.
    pub fn build(
        &self,
        node_type: &str,
        config: &serde_json::Value,
    ) -> Option<Result<Box<dyn Node>, NodeError>> {
        self.descriptors.get(node_type).map(|d| (d.build)(config))
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.descriptors.values()
    }

    /// The catalog in its external form.
    pub fn catalog(&self) -> Vec<NodeInfo> {
        self.descriptors().map(NodeDescriptor::info).collect()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        NodeRegistry::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_registry_has_all_eight_kinds() {
        let registry = NodeRegistry::builtin();
        for ty in [
            "ReadCSV",
            "Filter",
            "Select",
            "Sort",
            "Formula",
            "Join",
            "Aggregate",
            "Output",
        ] {
            assert!(registry.contains(ty), "missing {ty}");
        }
        assert_eq!(registry.catalog().len(), 8);
    }

    #[test]
    fn unknown_kind_is_none() {
        let registry = NodeRegistry::builtin();
        assert!(registry.build("Teleport", &json!({})).is_none());
    }

    #[test]
    fn config_failure_is_some_err() {
        let registry = NodeRegistry::builtin();
        let built = registry.build("Formula", &json!({})).unwrap();
        assert!(built.is_err());
    }

    #[test]
    fn catalog_counts_match_contract() {
        let registry = NodeRegistry::builtin();
        let catalog = registry.catalog();
        let read = catalog.iter().find(|i| i.node_type == "ReadCSV").unwrap();
        assert_eq!((read.input_count, read.output_count), (0, 1));
        let join = catalog.iter().find(|i| i.node_type == "Join").unwrap();
        assert_eq!(join.input_count, 2);
        assert_eq!(join.input_ports, vec!["in_0", "in_1"]);
        let output = catalog.iter().find(|i| i.node_type == "Output").unwrap();
        assert_eq!(output.output_count, 0);
    }
}
