//! Per-node result records.

use table::Table;

/// What one node produced during a run: either an output table plus
/// metadata, or an error message. Stored in the run's results map and
/// marshalled to the external form by the HTTP layer.
#[derive(Debug, Clone)]
pub struct NodeResult {
    pub success: bool,
    pub data: Option<Table>,
    pub error: Option<String>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl NodeResult {
    pub fn ok(data: Option<Table>, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        NodeResult {
            success: true,
            data,
            error: None,
            metadata,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        NodeResult {
            success: false,
            data: None,
            error: Some(message.into()),
            metadata: serde_json::Map::new(),
        }
    }

    /// Row count of the output table (0 when there is none).
    pub fn rows(&self) -> usize {
        self.data.as_ref().map_or(0, Table::num_rows)
    }

    /// Column names of the output table (empty when there is none).
    pub fn columns(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|t| t.column_names().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Up to `n` leading rows as JSON objects.
    pub fn preview(&self, n: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.data.as_ref().map(|t| t.preview(n)).unwrap_or_default()
    }
}
