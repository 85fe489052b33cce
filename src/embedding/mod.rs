//! Embedding + model utilities.
//!
//! - [`encoder`] provides pooled and per-token embeddings (coarse retrieval + verification).
//! - [`cross_encoder`] provides the local cross-encoder used by [`crate::rerank`].

/// BERT encoder/classifier wrappers.
pub mod bert;
/// Local cross-encoder (query, document) scorer.
pub mod cross_encoder;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// BERT bi-encoder.
pub mod encoder;
mod error;
/// Tokenizer/model loading helpers.
pub mod utils;

pub use cross_encoder::{CrossEncoder, CrossEncoderConfig, CrossEncoderError};
pub use encoder::{BertEmbedder, ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};
pub use error::EmbeddingError;

use crate::index::normalize_in_place;

/// Text embedding capability used by the retrieval pipeline.
///
/// Implementations are CPU/GPU bound and synchronous; async callers run them on the
/// blocking pool.
pub trait Embedder: Send + Sync {
    /// Pooled, unit-norm sentence vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Per-token vectors, each unit-norm.
    fn embed_tokens(&self, text: &str) -> Result<TokenEmbeddings, EmbeddingError>;

    fn embedding_dim(&self) -> usize;

    fn is_stub(&self) -> bool {
        false
    }
}

/// Row-major `[tokens, dim]` matrix of unit-norm token vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenEmbeddings {
    data: Vec<f32>,
    dim: usize,
}

impl TokenEmbeddings {
    /// Builds from per-token rows, normalizing each row. Zero rows stay zero.
    pub fn from_rows(rows: Vec<Vec<f32>>, dim: usize) -> Result<Self, EmbeddingError> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for mut row in rows {
            if row.len() != dim {
                return Err(EmbeddingError::TokenDimMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            normalize_in_place(&mut row);
            data.extend(row);
        }
        Ok(Self { data, dim })
    }

    pub fn empty(dim: usize) -> Self {
        Self {
            data: Vec::new(),
            dim,
        }
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim.max(1))
    }
}
