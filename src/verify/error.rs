use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("token embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("verification task failed: {reason}")]
    TaskFailed { reason: String },
}
