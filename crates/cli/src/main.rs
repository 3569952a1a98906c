//! `tabflow` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — start the API server.
//! - `run`      — execute a workflow JSON file against local directories.
//! - `validate` — validate a workflow JSON file and print its order.
//! - `nodes`    — list the available node kinds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use engine::{validate_dag, Workflow, WorkflowExecutor};
use store::FsTableStore;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "tabflow",
    about = "Data transformation workflow engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, default_value = "data/uploads", env = "TABFLOW_UPLOAD_DIR")]
        upload_dir: PathBuf,
        #[arg(long, default_value = "data/outputs", env = "TABFLOW_OUTPUT_DIR")]
        output_dir: PathBuf,
    },
    /// Execute a workflow definition JSON file and print per-node results.
    Run {
        /// Path to the workflow JSON file.
        path: PathBuf,
        #[arg(long, default_value = "data/uploads")]
        upload_dir: PathBuf,
        #[arg(long, default_value = "data/outputs")]
        output_dir: PathBuf,
    },
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// List the available node kinds.
    Nodes,
}

fn load_workflow(path: &PathBuf) -> anyhow::Result<Workflow> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).context("invalid workflow JSON")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            bind,
            upload_dir,
            output_dir,
        } => {
            info!("Starting API server on {bind}");
            api::serve(&bind, upload_dir, output_dir).await?;
        }

        Command::Run {
            path,
            upload_dir,
            output_dir,
        } => {
            let workflow = load_workflow(&path)?;
            let store = Arc::new(FsTableStore::new(upload_dir, output_dir)?);
            let executor = WorkflowExecutor::with_builtins(store);

            let report = executor.execute(&workflow)?;
            for (node_id, result) in &report.results {
                if result.success {
                    println!(
                        "{node_id}: ok ({} rows, {} columns)",
                        result.rows(),
                        result.columns().len()
                    );
                } else {
                    println!(
                        "{node_id}: FAILED: {}",
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            if report.results.values().any(|r| !r.success) {
                anyhow::bail!("workflow completed with failures");
            }
        }

        Command::Validate { path } => {
            let workflow = load_workflow(&path)?;
            match validate_dag(&workflow) {
                Ok(order) => {
                    println!("workflow is valid; execution order: {}", order.join(" -> "));
                }
                Err(e) => anyhow::bail!("invalid workflow: {e}"),
            }
        }

        Command::Nodes => {
            let store = Arc::new(store::MemTableStore::new());
            let executor = WorkflowExecutor::with_builtins(store);
            for info in executor.catalog() {
                println!(
                    "{:<10} {:<16} in={} out={}  {}",
                    info.node_type,
                    info.display_name,
                    info.input_count,
                    info.output_count,
                    info.description
                );
            }
        }
    }

    Ok(())
}
