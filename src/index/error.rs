use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("matrix file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read or write matrix: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("array '{name}' not found in archive")]
    MissingArray { name: String },

    #[error("matrix must be (N, D) or (N, 1, D), got shape {shape:?}")]
    InvalidShape { shape: Vec<usize> },

    #[error("embedding matrix is empty")]
    EmptyMatrix,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("row {row} has zero norm and cannot be normalized")]
    ZeroNormRow { row: usize },

    #[error("row {row} contains a non-finite value")]
    NonFiniteValue { row: usize },

    #[error("query vector contains a non-finite value")]
    NonFiniteQuery,
}

pub type IndexResult<T> = Result<T, IndexError>;
