//! Workflow execution engine.
//!
//! `WorkflowExecutor` is the orchestrator:
//! 1. Validates the DAG and produces the canonical topological ordering.
//! 2. Instantiates every node from the catalog, parsing configs up front.
//! 3. Visits nodes in order, handing each the cached outputs of its
//!    upstream neighbours sorted by destination port name.
//! 4. Records a per-node result; a failed node never halts the run, its
//!    dependents just see fewer inputs and fail by their own contract.
//!
//! Panics inside a node are caught and converted into failed results.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nodes::{Node, NodeContext, NodeError, NodeInfo, NodeRegistry};
use store::TableStore;
use table::Table;
use tracing::{error, info, instrument, warn};

use crate::dag::validate_dag;
use crate::models::Workflow;
use crate::result::NodeResult;
use crate::EngineError;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag for a run. The node that is currently
/// executing finishes; nodes not yet started are skipped and get no result
/// entry.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Execution report
// ---------------------------------------------------------------------------

/// The outcome of one `execute` call: per-node results keyed by node id,
/// plus whether the run was cut short by cancellation.
#[derive(Debug)]
pub struct ExecutionReport {
    pub results: BTreeMap<String, NodeResult>,
    pub cancelled: bool,
}

// ---------------------------------------------------------------------------
// WorkflowExecutor
// ---------------------------------------------------------------------------

/// Stateless orchestrator for workflow runs.
///
/// Holds only the immutable node catalog and the injected table store, so a
/// single executor serves concurrent `execute` calls.
pub struct WorkflowExecutor {
    registry: NodeRegistry,
    store: Arc<dyn TableStore>,
}

impl WorkflowExecutor {
    pub fn new(registry: NodeRegistry, store: Arc<dyn TableStore>) -> WorkflowExecutor {
        WorkflowExecutor { registry, store }
    }

    /// Executor over the built-in node kinds.
    pub fn with_builtins(store: Arc<dyn TableStore>) -> WorkflowExecutor {
        WorkflowExecutor::new(NodeRegistry::builtin(), store)
    }

    /// Node-kind metadata for the HTTP layer.
    pub fn catalog(&self) -> Vec<NodeInfo> {
        self.registry.catalog()
    }

    /// Run a workflow to completion.
    ///
    /// # Errors
    /// Only graph-level problems ([`EngineError`]): empty workflow, unknown
    /// node type, edge to a missing node, or a cycle. Per-node failures are
    /// recorded in the report and never abort the run.
    pub fn execute(&self, workflow: &Workflow) -> Result<ExecutionReport, EngineError> {
        self.execute_with_cancel(workflow, &CancelToken::new())
    }

    /// [`WorkflowExecutor::execute`] with cooperative cancellation. On
    /// cancel the report carries the results produced so far and
    /// `cancelled = true`.
    #[instrument(skip_all, fields(nodes = workflow.nodes.len(), edges = workflow.edges.len()))]
    pub fn execute_with_cancel(
        &self,
        workflow: &Workflow,
        cancel: &CancelToken,
    ) -> Result<ExecutionReport, EngineError> {
        if workflow.nodes.is_empty() {
            return Err(EngineError::EmptyWorkflow);
        }

        let execution_order = validate_dag(workflow)?;
        info!("execution order: {execution_order:?}");

        // Instantiate all nodes up front; config parsing happens here so a
        // bad config fails its node before any compute starts.
        let mut built: HashMap<&str, Result<Box<dyn Node>, NodeError>> = HashMap::new();
        for def in &workflow.nodes {
            let node = self
                .registry
                .build(&def.node_type, &def.config)
                .ok_or_else(|| EngineError::UnknownNodeType(def.node_type.clone()))?;
            built.insert(def.id.as_str(), node);
        }

        // Reverse adjacency: id → (upstream id, from_port, to_port).
        let mut reverse_adj: HashMap<&str, Vec<(&str, &str, &str)>> = HashMap::new();
        for edge in &workflow.edges {
            reverse_adj.entry(edge.to_node_id.as_str()).or_default().push((
                edge.from_node_id.as_str(),
                edge.from_port.as_str(),
                edge.to_port.as_str(),
            ));
        }

        let mut results: BTreeMap<String, NodeResult> = BTreeMap::new();
        let mut outputs: HashMap<String, Table> = HashMap::new();
        let mut cancelled = false;

        for node_id in &execution_order {
            if cancel.is_cancelled() {
                warn!("run cancelled before node '{node_id}'");
                cancelled = true;
                break;
            }

            let inputs = gather_inputs(node_id, &reverse_adj, &outputs);

            let result = match &built[node_id.as_str()] {
                Err(config_err) => NodeResult::err(config_err.to_string()),
                Ok(node) => {
                    let ctx = NodeContext {
                        store: self.store.as_ref(),
                    };
                    match catch_unwind(AssertUnwindSafe(|| node.execute(inputs, &ctx))) {
                        Ok(Ok(output)) => {
                            if let Some(table) = &output.data {
                                outputs.insert(node_id.clone(), table.clone());
                            }
                            NodeResult::ok(output.data, output.metadata)
                        }
                        Ok(Err(node_err)) => NodeResult::err(node_err.to_string()),
                        Err(panic) => NodeResult::err(format!(
                            "node panicked: {}",
                            panic_message(panic.as_ref())
                        )),
                    }
                }
            };

            if result.success {
                info!(
                    "node '{node_id}' succeeded: {} rows, {} columns",
                    result.rows(),
                    result.columns().len()
                );
            } else {
                error!(
                    "node '{node_id}' failed: {}",
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.insert(node_id.clone(), result);
        }

        Ok(ExecutionReport { results, cancelled })
    }
}

/// Gather the cached outputs of a node's upstream neighbours, ordered by
/// ascending destination-port name. Upstreams without a cached output (they
/// failed, or produced none) are skipped with a warning; the downstream node
/// reacts through its own input-count contract.
fn gather_inputs(
    node_id: &str,
    reverse_adj: &HashMap<&str, Vec<(&str, &str, &str)>>,
    outputs: &HashMap<String, Table>,
) -> Vec<Table> {
    let Some(upstream) = reverse_adj.get(node_id) else {
        return Vec::new();
    };

    let mut ordered = upstream.clone();
    ordered.sort_by(|a, b| a.2.cmp(b.2));

    let mut inputs = Vec::with_capacity(ordered.len());
    for (upstream_id, _from_port, _to_port) in ordered {
        match outputs.get(upstream_id) {
            // Tables are immutable values: the clone is an independent copy
            // as far as any observer can tell.
            Some(table) => inputs.push(table.clone()),
            None => warn!("missing output from '{upstream_id}' for '{node_id}'"),
        }
    }
    inputs
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
