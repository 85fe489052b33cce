use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse corpus JSON: {reason}")]
    Parse { reason: String },

    #[error("corpus is empty")]
    Empty,

    #[error("corpus has {corpus} entries but the embedding matrix has {matrix} rows")]
    MatrixMismatch { corpus: usize, matrix: usize },
}
