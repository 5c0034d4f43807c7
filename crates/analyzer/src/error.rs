use thiserror::Error;

/// Adapter-level errors. The analysis core itself never errors on data
/// shape; only file I/O and format problems surface here.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no input files found under {0}")]
    NoInput(String),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),
}
