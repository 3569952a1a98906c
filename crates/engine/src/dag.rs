//! DAG validation — run before executing a workflow.
//!
//! Rules enforced:
//! 1. Node IDs must be unique within the workflow.
//! 2. Every edge must reference valid node IDs (both ends).
//! 3. The directed graph must be acyclic (topological sort must succeed).
//!
//! Returns the canonical execution order on success: Kahn's algorithm with
//! the ready set kept as a min-heap on node id, so ties always break
//! lexicographically and two runs of the same document order identically.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{models::Workflow, EngineError};

/// Validate the workflow's DAG and return nodes in topological execution
/// order.
///
/// # Errors
/// - [`EngineError::DuplicateNodeId`] if two nodes share an ID.
/// - [`EngineError::UnknownNodeReference`] if an edge references a missing node.
/// - [`EngineError::CycleDetected`] if the graph is not acyclic.
pub fn validate_dag(workflow: &Workflow) -> Result<Vec<String>, EngineError> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    for node in &workflow.nodes {
        if !seen_ids.insert(node.id.as_str()) {
            return Err(EngineError::DuplicateNodeId(node.id.clone()));
        }
    }

    let node_set: HashSet<&str> = workflow.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &workflow.edges {
        if !node_set.contains(edge.from_node_id.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.from_node_id.clone(),
                side: "from",
            });
        }
        if !node_set.contains(edge.to_node_id.as_str()) {
            return Err(EngineError::UnknownNodeReference {
                node_id: edge.to_node_id.clone(),
                side: "to",
            });
        }
    }

    // Kahn's algorithm over adjacency + in-degree.
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for node in &workflow.nodes {
        adjacency.entry(node.id.as_str()).or_default();
        in_degree.entry(node.id.as_str()).or_insert(0);
    }

    for edge in &workflow.edges {
        adjacency
            .entry(edge.from_node_id.as_str())
            .or_default()
            .push(edge.to_node_id.as_str());
        *in_degree.entry(edge.to_node_id.as_str()).or_insert(0) += 1;
    }

    // Ready set as a min-heap on id: the least id is always dequeued first.
    let mut ready: BinaryHeap<Reverse<&str>> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(&id, _)| Reverse(id))
        .collect();

    let mut sorted: Vec<String> = Vec::with_capacity(workflow.nodes.len());

    while let Some(Reverse(node_id)) = ready.pop() {
        sorted.push(node_id.to_owned());

        if let Some(neighbours) = adjacency.get(node_id) {
            for &neighbour in neighbours {
                let deg = in_degree.entry(neighbour).or_insert(0);
                *deg -= 1;
                if *deg == 0 {
                    ready.push(Reverse(neighbour));
                }
            }
        }
    }

    // If we didn't visit every node the graph contains a cycle.
    if sorted.len() != workflow.nodes.len() {
        return Err(EngineError::CycleDetected);
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, NodeDefinition};

    fn make_node(id: &str) -> NodeDefinition {
        NodeDefinition {
            id: id.to_string(),
            node_type: "Filter".into(),
            config: serde_json::Value::Null,
        }
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge {
            from_node_id: from.into(),
            to_node_id: to.into(),
            from_port: "out".into(),
            to_port: "in".into(),
        }
    }

    #[test]
    fn valid_linear_dag_returns_sorted_order() {
        // A → B → C
        let workflow = Workflow::new(
            vec![make_node("a"), make_node("b"), make_node("c")],
            vec![edge("a", "b"), edge("b", "c")],
        );

        let sorted = validate_dag(&workflow).expect("should be valid");
        assert_eq!(sorted, vec!["a", "b", "c"]);
    }

    #[test]
    fn diamond_dag_breaks_ties_lexicographically() {
        //   A
        //  / \
        // C   B
        //  \ /
        //   D
        let workflow = Workflow::new(
            vec![make_node("a"), make_node("d"), make_node("c"), make_node("b")],
            vec![
                edge("a", "b"),
                edge("a", "c"),
                edge("b", "d"),
                edge("c", "d"),
            ],
        );

        let sorted = validate_dag(&workflow).expect("should be valid");
        // b and c become ready together; b is dequeued first.
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn independent_nodes_order_by_id() {
        let workflow = Workflow::new(
            vec![make_node("z"), make_node("m"), make_node("a")],
            vec![],
        );
        let sorted = validate_dag(&workflow).expect("should be valid");
        assert_eq!(sorted, vec!["a", "m", "z"]);
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let workflow = Workflow::new(vec![make_node("a"), make_node("a")], vec![]);
        assert!(matches!(
            validate_dag(&workflow),
            Err(EngineError::DuplicateNodeId(id)) if id == "a"
        ));
    }

    #[test]
    fn edge_referencing_missing_node_is_rejected() {
        let workflow = Workflow::new(vec![make_node("a")], vec![edge("a", "ghost")]);
        assert!(matches!(
            validate_dag(&workflow),
            Err(EngineError::UnknownNodeReference { node_id, .. }) if node_id == "ghost"
        ));
    }

    #[test]
    fn cycle_is_detected() {
        // A → B → C → A
        let workflow = Workflow::new(
            vec![make_node("a"), make_node("b"), make_node("c")],
            vec![edge("a", "b"), edge("b", "c"), edge("c", "a")],
        );
        assert_eq!(validate_dag(&workflow), Err(EngineError::CycleDetected));
    }

    #[test]
    fn single_node_no_edges_is_valid() {
        let workflow = Workflow::new(vec![make_node("solo")], vec![]);
        let sorted = validate_dag(&workflow).expect("single node should be valid");
        assert_eq!(sorted, vec!["solo"]);
    }
}
