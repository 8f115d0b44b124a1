use std::io;
use thiserror::Error;

/// Failures that abort loading or analysing a batch.
///
/// Row-level problems are never reported here: invalid rows are skipped and
/// unparseable dates degrade to a textual form.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Batch contains no value ranges")]
    EmptyBatch,

    #[error("Value range #{index} has no table name")]
    UnnamedRange { index: usize },

    #[error("Row {row} in '{table}' has {cells} cells (at most {max} expected)")]
    RowTooWide {
        table: String,
        row: usize,
        cells: usize,
        max: usize,
    },
}

pub type Result<T> = std::result::Result<T, FleetError>;
