//! Source and sink nodes: ReadCSV and Output.

use serde::Deserialize;
use store::StoreError;
use table::codec::ReadOptions;
use table::Table;
use tracing::debug;

use crate::traits::{parse_config, single_input, Node, NodeContext, NodeOutput};
use crate::NodeError;

// ---------------------------------------------------------------------------
// ReadCSV
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReadCsvConfig {
    upload_id: String,
    #[serde(default = "default_header")]
    header: bool,
    #[serde(default = "default_sep")]
    sep: String,
}

fn default_header() -> bool {
    true
}

fn default_sep() -> String {
    ",".to_string()
}

/// Load a table from an uploaded CSV file.
pub struct ReadCsvNode {
    upload_id: String,
    options: ReadOptions,
}

impl ReadCsvNode {
    pub fn from_config(config: &serde_json::Value) -> Result<ReadCsvNode, NodeError> {
        let cfg: ReadCsvConfig = parse_config(config)?;
        if cfg.upload_id.is_empty() {
            return Err(NodeError::Config("No upload_id specified".into()));
        }
        let sep = cfg.sep.as_bytes();
        if sep.len() != 1 {
            return Err(NodeError::Config(format!(
                "sep must be a single character, got '{}'",
                cfg.sep
            )));
        }
        Ok(ReadCsvNode {
            upload_id: cfg.upload_id,
            options: ReadOptions {
                has_header: cfg.header,
                delimiter: sep[0],
            },
        })
    }
}

impl Node for ReadCsvNode {
    fn execute(&self, _inputs: Vec<Table>, ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let table = ctx
            .store
            .read_csv(&self.upload_id, &self.options)
            .map_err(|e| match e {
                StoreError::NotFound(id) => {
                    NodeError::Io(format!("Uploaded file not found: {id}"))
                }
                other => NodeError::Io(format!("Failed to read CSV: {other}")),
            })?;
        debug!(
            "read upload {}: {} rows, {} columns",
            self.upload_id,
            table.num_rows(),
            table.num_columns()
        );
        Ok(NodeOutput::table(table).with_meta("upload_id", self.upload_id.clone()))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OutputConfig {
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

/// Write the input table to the store for download; echoes the input as
/// `data` so downstream previews still work.
#[derive(Debug)]
pub struct OutputNode {
    format: String,
}

impl OutputNode {
    pub fn from_config(config: &serde_json::Value) -> Result<OutputNode, NodeError> {
        let cfg: OutputConfig = parse_config(config)?;
        if cfg.format != "csv" {
            return Err(NodeError::Config(format!(
                "Unsupported output format: {}",
                cfg.format
            )));
        }
        Ok(OutputNode { format: cfg.format })
    }
}

impl Node for OutputNode {
    fn execute(&self, inputs: Vec<Table>, ctx: &NodeContext<'_>) -> Result<NodeOutput, NodeError> {
        let table = single_input(inputs, "output")?;
        let file_id = ctx
            .store
            .write_csv(&table)
            .map_err(|e| NodeError::Io(format!("Failed to write output: {e}")))?;
        Ok(NodeOutput::table(table)
            .with_meta("file_id", file_id)
            .with_meta("format", self.format.clone()))
    }
}
