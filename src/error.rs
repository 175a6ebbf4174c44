use std::path::PathBuf;

use thiserror::Error;

/// order_analytics error types
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// An input table does not exist on disk
    #[error("input file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// The CSV reader could not open or decode a file as a whole
    #[error("csv error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for order_analytics
pub type Result<T> = std::result::Result<T, AnalyticsError>;
