//! Workflow execution and the node catalog.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use engine::{NodeResult, Workflow};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{api_error, ApiError};
use crate::AppState;

const PREVIEW_ROWS: usize = 100;

#[derive(Deserialize)]
pub struct RunWorkflowRequest {
    pub workflow: Workflow,
}

/// External form of a per-node result.
#[derive(Serialize)]
pub struct NodeOutputDto {
    pub node_id: String,
    pub success: bool,
    pub rows: usize,
    pub columns: Vec<String>,
    pub preview: Vec<serde_json::Map<String, serde_json::Value>>,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct RunWorkflowResponse {
    /// `success`, `partial` (some nodes failed), or `error`.
    pub status: String,
    pub node_outputs: BTreeMap<String, NodeOutputDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_output_url: Option<String>,
    pub errors: Vec<String>,
}

pub async fn run_workflow(
    State(state): State<AppState>,
    Json(request): Json<RunWorkflowRequest>,
) -> Result<Json<RunWorkflowResponse>, ApiError> {
    let workflow = request.workflow;
    info!(
        "running workflow with {} nodes, {} edges",
        workflow.nodes.len(),
        workflow.edges.len()
    );

    let executor = state.executor.clone();
    let report = tokio::task::spawn_blocking(move || executor.execute(&workflow))
        .await
        .map_err(|e| {
            api_error(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            )
        })?;

    let report = match report {
        Ok(report) => report,
        Err(engine_err) => {
            error!("workflow error: {engine_err}");
            return Ok(Json(RunWorkflowResponse {
                status: "error".into(),
                node_outputs: BTreeMap::new(),
                final_output_url: None,
                errors: vec![engine_err.to_string()],
            }));
        }
    };

    let mut node_outputs = BTreeMap::new();
    let mut errors = Vec::new();
    let mut final_output_url = None;

    for (node_id, result) in &report.results {
        node_outputs.insert(node_id.clone(), to_dto(node_id, result));

        if let Some(message) = &result.error {
            errors.push(format!("{node_id}: {message}"));
        }
        if let Some(file_id) = result.metadata.get("file_id").and_then(|v| v.as_str()) {
            final_output_url = Some(format!("/api/download/{file_id}"));
        }
    }

    let status = if errors.is_empty() {
        "success"
    } else if report.results.values().any(|r| r.success) {
        "partial"
    } else {
        "error"
    };

    Ok(Json(RunWorkflowResponse {
        status: status.into(),
        node_outputs,
        final_output_url,
        errors,
    }))
}

pub async fn node_catalog(State(state): State<AppState>) -> Json<Vec<engine::NodeInfo>> {
    Json(state.executor.catalog())
}

fn to_dto(node_id: &str, result: &NodeResult) -> NodeOutputDto {
    NodeOutputDto {
        node_id: node_id.to_string(),
        success: result.success,
        rows: result.rows(),
        columns: result.columns(),
        preview: result.preview(PREVIEW_ROWS),
        error: result.error.clone(),
    }
}
