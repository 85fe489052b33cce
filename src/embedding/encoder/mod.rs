//! BERT-family bi-encoder (bge-style).
//!
//! One forward pass yields both signals the cascade needs: the CLS hidden state is the
//! pooled sentence vector used for coarse retrieval, and the full hidden-state sequence
//! feeds token-level MaxSim verification.
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

/// Encoder configuration.
pub mod config;


pub use config::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};

use candle_core::{Device, IndexOp, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::{check_model_dir, load_tokenizer_with_truncation};
use crate::embedding::{Embedder, TokenEmbeddings};
use crate::hashing::hash_to_u64;
use crate::index::normalize_in_place;

enum EncoderBackend {
    Model {
        model: BertEncoder,
        tokenizer: Box<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Embedding generator backed by a BERT encoder (supports stub mode).
pub struct BertEmbedder {
    backend: EncoderBackend,
    config: EncoderConfig,
    dim: usize,
}

impl std::fmt::Debug for BertEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl BertEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!(
                embedding_dim = config.embedding_dim,
                "Encoder running in STUB mode (testing only)"
            );
            let dim = config.embedding_dim;
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
                dim,
            });
        }

        check_model_dir(&config.model_dir)
            .map_err(|reason| EmbeddingError::ModelLoadFailed { reason })?;

        let device = select_device()?;
        debug!(?device, "Selected compute device for encoder");

        let model = BertEncoder::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(&config.model_dir, config.max_seq_len)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        let dim = model.hidden_size();
        info!(
            model_dir = %config.model_dir.display(),
            hidden_size = dim,
            max_seq_len = config.max_seq_len,
            "Encoder model loaded successfully"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer: Box::new(tokenizer),
                device,
            },
            config,
            dim,
        })
    }

    /// Convenience constructor for a stub embedder of the given dimension.
    pub fn stub(embedding_dim: usize) -> Result<Self, EmbeddingError> {
        Self::load(EncoderConfig::stub_with_dim(embedding_dim))
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn hidden_states(
        &self,
        text: &str,
        model: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Running encoder forward pass"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let hidden = model
            .forward(&input_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })?;

        // [1, seq_len, hidden] -> seq_len rows
        Ok(hidden.i(0)?.to_vec2::<f32>()?)
    }

    fn stub_words(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Deterministic pseudo-random unit vector seeded by the token's BLAKE3 hash.
    fn stub_vector(&self, token: &str) -> Vec<f32> {
        let mut state = hash_to_u64(token.as_bytes());
        let mut v: Vec<f32> = (0..self.dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect();
        normalize_in_place(&mut v);
        v
    }
}

impl Embedder for BertEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => {
                let mut cls = self
                    .hidden_states(text, model, tokenizer, device)?
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| vec![0.0; self.dim]);
                normalize_in_place(&mut cls);
                Ok(cls)
            }
            EncoderBackend::Stub => {
                let mut pooled = vec![0.0f32; self.dim];
                for word in Self::stub_words(text) {
                    for (acc, v) in pooled.iter_mut().zip(self.stub_vector(&word)) {
                        *acc += v;
                    }
                }
                normalize_in_place(&mut pooled);
                Ok(pooled)
            }
        }
    }

    fn embed_tokens(&self, text: &str) -> Result<TokenEmbeddings, EmbeddingError> {
        let rows = match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.hidden_states(text, model, tokenizer, device)?,
            EncoderBackend::Stub => Self::stub_words(text)
                .iter()
                .map(|w| self.stub_vector(w))
                .collect(),
        };
        TokenEmbeddings::from_rows(rows, self.dim)
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }

    fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }
}
