//! In-process reranker backed by the candle cross-encoder.

use std::sync::Arc;

use async_trait::async_trait;

use super::Reranker;
use super::error::RerankError;
use super::types::RerankScores;
use crate::embedding::{CrossEncoder, CrossEncoderConfig};

#[derive(Debug, Clone)]
pub struct CrossEncoderReranker {
    encoder: Arc<CrossEncoder>,
}

impl CrossEncoderReranker {
    pub fn new(encoder: CrossEncoder) -> Self {
        Self {
            encoder: Arc::new(encoder),
        }
    }

    pub fn load(config: CrossEncoderConfig) -> Result<Self, RerankError> {
        Ok(Self::new(CrossEncoder::load(config)?))
    }

    pub fn stub() -> Result<Self, RerankError> {
        Ok(Self::new(CrossEncoder::stub()?))
    }

    pub fn is_model_loaded(&self) -> bool {
        self.encoder.is_model_loaded()
    }
}

#[async_trait]
impl Reranker for CrossEncoderReranker {
    async fn rerank(&self, query: &str, documents: &[String]) -> Result<RerankScores, RerankError> {
        let encoder = Arc::clone(&self.encoder);
        let query = query.to_string();
        let documents = documents.to_vec();

        let scores = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = documents.iter().map(String::as_str).collect();
            encoder.score_all(&query, &refs)
        })
        .await
        .map_err(|e| RerankError::Transport {
            reason: format!("cross-encoder task failed: {}", e),
        })??;

        RerankScores::from_dense(scores)
    }

    fn backend_name(&self) -> &'static str {
        if self.is_model_loaded() {
            "cross_encoder"
        } else {
            "cross_encoder_stub"
        }
    }
}
