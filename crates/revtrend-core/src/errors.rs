//! Error types for the revtrend core library.

use std::path::PathBuf;

/// Top-level error enum for the revtrend core library.
///
/// Batch callers match on the variant to decide whether a failure is
/// per-document (log and continue) or fatal for the whole run.
#[derive(Debug, thiserror::Error)]
pub enum RevtrendError {
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("no table found on the first page of {}", .0.display())]
    NoTableFound(PathBuf),

    #[error("table in {} has no data rows", .0.display())]
    EmptyTable(PathBuf),

    #[error("unrecognized quarter label: {0:?}")]
    QuarterLabel(String),

    #[error("failed to read PDF {}: {message}", .path.display())]
    Pdf { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type RevtrendResult<T> = Result<T, RevtrendError>;
