use std::path::PathBuf;
use thiserror::Error;

/// Encoder failures. At startup these leave the service uninitialized; during a request
/// they become a rerank-gate rejection.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("encoder model directory not found: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load encoder: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("encoder forward pass failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("token vector has dim {actual}, expected {expected}")]
    TokenDimMismatch { expected: usize, actual: usize },

    #[error("invalid encoder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}
