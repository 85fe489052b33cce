use thiserror::Error;

use crate::config::ConfigError;
use crate::constants::DimValidationError;
use crate::corpus::CorpusError;
use crate::embedding::EmbeddingError;
use crate::index::IndexError;
use crate::rerank::RerankError;
use crate::verify::VerifierError;

/// Failures that are not gate decisions. At request time these become HTTP 500; at
/// startup they leave the service uninitialized (HTTP 503).
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("verification error: {0}")]
    Verifier(#[from] VerifierError),

    #[error("reranker setup error: {0}")]
    Reranker(#[from] RerankError),

    #[error("embedding dimension error: {0}")]
    Dimension(#[from] DimValidationError),

    #[error("candidate {index} has no corpus entry")]
    MissingEntry { index: usize },

    #[error("background task failed: {reason}")]
    TaskFailed { reason: String },
}
