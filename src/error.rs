use std::path::PathBuf;
use thiserror::Error;

use crate::region::InvalidCoordinate;

/// Errors surfaced by the loader and report writers.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// A snapshot file that must be present was not found.
    #[error("missing snapshot file: {}", path.display())]
    MissingFile { path: PathBuf },
}
