use thiserror::Error;

use crate::embedding::CrossEncoderError;

/// Reranker adapter failures. The cascade maps all of them to a Gate-3 rejection.
#[derive(Debug, Error)]
pub enum RerankError {
    #[error("rerank request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("rerank transport error: {reason}")]
    Transport { reason: String },

    #[error("rerank service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed rerank response: {reason}")]
    Malformed { reason: String },

    #[error("local cross-encoder failed: {0}")]
    Local(#[from] CrossEncoderError),

    #[error("invalid reranker configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for RerankError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RerankError::Malformed {
                reason: err.to_string(),
            }
        } else {
            RerankError::Transport {
                reason: err.to_string(),
            }
        }
    }
}
