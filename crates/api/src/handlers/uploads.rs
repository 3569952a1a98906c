//! Upload lifecycle: upload, inspect, delete, download results.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use store::TableStore;
use table::codec::ReadOptions;
use tracing::info;
use uuid::Uuid;

use super::{api_error, ApiError};
use crate::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub upload_id: String,
    pub filename: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub preview: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Accept one CSV file as multipart form data and store it under a fresh
/// upload id.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid upload: {e}")))?
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No file provided"))?;

    let filename = field
        .file_name()
        .map(str::to_string)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No filename provided"))?;

    if !filename.to_lowercase().ends_with(".csv") {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Only CSV files are supported",
        ));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Upload failed: {e}")))?;

    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        let upload_id = state.store.save_upload(&bytes)?;
        // Parse immediately so a bad file is rejected at upload time.
        match state.store.read_csv(&upload_id, &ReadOptions::default()) {
            Ok(table) => Ok((upload_id, table)),
            Err(e) => {
                let _ = state.store.delete_upload(&upload_id);
                Err(e)
            }
        }
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match result {
        Ok((upload_id, table)) => {
            info!("uploaded {filename} as {upload_id}");
            Ok(Json(UploadResponse {
                upload_id,
                filename,
                rows: table.num_rows(),
                columns: table.column_names().into_iter().map(str::to_string).collect(),
                preview: table.preview(10),
            }))
        }
        Err(e) => Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid CSV format: {e}"),
        )),
    }
}

/// Metadata and a short preview for a stored upload.
pub async fn upload_info(
    Path(upload_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_id(&upload_id, "upload ID")?;

    let table = tokio::task::spawn_blocking({
        let state = state.clone();
        let upload_id = upload_id.clone();
        move || state.store.read_csv(&upload_id, &ReadOptions::default())
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(|e| match e {
        store::StoreError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Upload not found"),
        other => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read file: {other}"),
        ),
    })?;

    Ok(Json(serde_json::json!({
        "upload_id": upload_id,
        "rows": table.num_rows(),
        "columns": table.column_names(),
        "preview": table.preview(10),
    })))
}

pub async fn delete_upload(
    Path(upload_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_id(&upload_id, "upload ID")?;

    match state.store.delete_upload(&upload_id) {
        Ok(()) => Ok(Json(serde_json::json!({
            "status": "deleted",
            "upload_id": upload_id,
        }))),
        Err(store::StoreError::NotFound(_)) => {
            Err(api_error(StatusCode::NOT_FOUND, "Upload not found"))
        }
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Stream a produced output file back as a CSV download.
pub async fn download(
    Path(file_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    validate_id(&file_id, "file ID")?;

    let path = state.store.output_path(&file_id);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| api_error(StatusCode::NOT_FOUND, "File not found"))?;

    let short = &file_id[..8];
    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"output-{short}.csv\""),
        ),
    ];
    Ok((headers, bytes))
}

/// Ids are uuids; anything else is rejected before touching the filesystem.
fn validate_id(id: &str, what: &str) -> Result<(), ApiError> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, format!("Invalid {what} format")))
}
