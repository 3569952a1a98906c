//! `engine` crate — the workflow document model, DAG validation, and the
//! execution engine.

pub mod dag;
pub mod error;
pub mod executor;
pub mod models;
pub mod result;

pub use dag::validate_dag;
pub use error::EngineError;
pub use executor::{CancelToken, ExecutionReport, WorkflowExecutor};
pub use models::{Edge, NodeDefinition, Workflow};
pub use nodes::NodeInfo;
pub use result::NodeResult;
