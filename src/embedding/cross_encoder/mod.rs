//! Local cross-encoder: jointly scores a (query, document) pair.
//!
//! Scores are sigmoid-squashed logits in `[0, 1]`, the same scale an HTTP rerank service
//! reports as `relevance_score`. Without a model directory the scorer falls back to a
//! lexical-overlap estimate (stub mode).

pub mod config;
pub mod error;


pub use config::{CrossEncoderConfig, MAX_SEQ_LEN};
pub use error::CrossEncoderError;

use std::collections::HashSet;
use std::sync::LazyLock;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::embedding::bert::BertClassifier;
use crate::embedding::device::select_device;
use crate::embedding::utils::{check_model_dir, load_tokenizer_with_truncation};

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
        "can", "need", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into",
        "through", "during", "before", "after", "above", "below", "between", "under", "again",
        "then", "once", "here", "there", "when", "where", "why", "how", "all", "each", "few",
        "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so",
        "than", "too", "very", "just", "and", "but", "if", "or", "because", "until", "while",
        "what", "which", "who", "whom", "this", "that", "these", "those", "am", "it", "its", "i",
        "my",
    ]
    .into_iter()
    .collect()
});

pub struct CrossEncoder {
    device: Device,
    config: CrossEncoderConfig,
    model: Option<(BertClassifier, Box<Tokenizer>)>,
}

impl std::fmt::Debug for CrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoder")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl CrossEncoder {
    pub fn load(config: CrossEncoderConfig) -> Result<Self, CrossEncoderError> {
        config
            .validate()
            .map_err(|reason| CrossEncoderError::InvalidConfig { reason })?;

        let Some(model_path) = config.model_path.clone() else {
            info!("No cross-encoder model path configured, operating in stub mode");
            return Ok(Self {
                device: Device::Cpu,
                config,
                model: None,
            });
        };

        check_model_dir(&model_path)
            .map_err(|reason| CrossEncoderError::ModelLoadFailed { reason })?;

        let device = select_device()?;
        debug!(?device, "Selected compute device for cross-encoder");

        info!(model_path = %model_path.display(), "Loading cross-encoder model");

        let model = BertClassifier::load(&model_path, &device).map_err(|e| {
            CrossEncoderError::ModelLoadFailed {
                reason: format!("Failed to load BERT classifier: {}", e),
            }
        })?;

        let tokenizer =
            load_tokenizer_with_truncation(&model_path, config.max_seq_len).map_err(|e| {
                CrossEncoderError::ModelLoadFailed {
                    reason: format!("Failed to load tokenizer: {}", e),
                }
            })?;

        info!("Cross-encoder model loaded successfully");

        Ok(Self {
            device,
            config,
            model: Some((model, Box::new(tokenizer))),
        })
    }

    pub fn stub() -> Result<Self, CrossEncoderError> {
        Self::load(CrossEncoderConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &CrossEncoderConfig {
        &self.config
    }

    /// Relevance of `document` to `query` in `[0, 1]`.
    pub fn score(&self, query: &str, document: &str) -> Result<f32, CrossEncoderError> {
        let Some((model, tokenizer)) = &self.model else {
            let score = placeholder_score(query, document);
            debug!(score, "Computed cross-encoder score (stub)");
            return Ok(score);
        };

        let tokens = tokenizer.encode((query, document), true).map_err(|e| {
            CrossEncoderError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = model
            .forward(&token_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| CrossEncoderError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let logit = logits
            .flatten_all()?
            .to_vec1::<f32>()?
            .first()
            .copied()
            .ok_or_else(|| CrossEncoderError::InferenceFailed {
                reason: "classifier returned no logits".to_string(),
            })?;

        Ok(sigmoid(logit))
    }

    /// Scores every document, returned in input order.
    pub fn score_all(
        &self,
        query: &str,
        documents: &[&str],
    ) -> Result<Vec<f32>, CrossEncoderError> {
        debug!(
            query_len = query.len(),
            num_documents = documents.len(),
            "Cross-encoding documents"
        );
        documents.iter().map(|doc| self.score(query, doc)).collect()
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn content_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(*w))
        .map(str::to_string)
        .collect()
}

/// Recall/Jaccard blend of content words, pushed through a steep sigmoid.
fn placeholder_score(query: &str, document: &str) -> f32 {
    let query_words = content_words(query);
    let document_words = content_words(document);

    if query_words.is_empty() {
        let len_ratio = (query.len().min(document.len()) as f32)
            / (query.len().max(document.len()).max(1) as f32);
        return len_ratio * 0.3;
    }

    let matches = query_words.intersection(&document_words).count();
    let recall = matches as f32 / query_words.len() as f32;

    let union = query_words.union(&document_words).count();
    let jaccard = if union > 0 {
        matches as f32 / union as f32
    } else {
        0.0
    };

    let base_score = 0.6 * recall + 0.4 * jaccard;

    sigmoid(8.0 * (base_score - 0.5)).clamp(0.0, 1.0)
}
