//! Request handlers and their DTOs.

pub mod run;
pub mod uploads;

use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

/// Error responses carry a `detail` message alongside the status code.
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub(crate) fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": detail.into() })))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}
