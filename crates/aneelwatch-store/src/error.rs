use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("results file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not replace {path}: {source}")]
    Persist {
        path: std::path::PathBuf,
        source: tempfile::PersistError,
    },
}
