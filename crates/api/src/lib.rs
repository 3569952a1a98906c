//! `api` crate — HTTP REST layer over the workflow engine.
//!
//! Exposes:
//!   POST   /api/upload
//!   POST   /api/run-workflow
//!   GET    /api/download/:file_id
//!   GET    /api/uploads/:upload_id
//!   DELETE /api/uploads/:upload_id
//!   GET    /api/nodes
//!   GET    /health

pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use engine::WorkflowExecutor;
use store::FsTableStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FsTableStore>,
    pub executor: Arc<WorkflowExecutor>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .route("/upload", post(handlers::uploads::upload))
        .route("/run-workflow", post(handlers::run::run_workflow))
        .route("/download/:file_id", get(handlers::uploads::download))
        .route(
            "/uploads/:upload_id",
            get(handlers::uploads::upload_info).delete(handlers::uploads::delete_upload),
        )
        .route("/nodes", get(handlers::run::node_catalog));

    Router::new()
        .nest("/api", api_router)
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API over the given bind address, with uploads and outputs
/// stored under the given directories.
pub async fn serve(
    bind: &str,
    upload_dir: PathBuf,
    output_dir: PathBuf,
) -> Result<(), std::io::Error> {
    let store = Arc::new(
        FsTableStore::new(upload_dir, output_dir)
            .map_err(|e| std::io::Error::other(e.to_string()))?,
    );
    let executor = Arc::new(WorkflowExecutor::with_builtins(store.clone()));
    let app = router(AppState { store, executor });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}
