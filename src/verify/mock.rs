use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::Verifier;
use crate::embedding::EmbeddingError;
use super::error::VerifierError;

/// Scripted verifier: fixed score per document text (unknown documents score `default`).
pub struct MockVerifier {
    scores: HashMap<String, f32>,
    default: f32,
    fail: bool,
    calls: AtomicUsize,
}

impl MockVerifier {
    pub fn new(default: f32) -> Self {
        Self {
            scores: HashMap::new(),
            default,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_score(mut self, document: impl Into<String>, score: f32) -> Self {
        self.scores.insert(document.into(), score);
        self
    }

    /// Fails every call as if the token embedder had errored.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0.0)
        }
    }

    /// Number of `verify_many` calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Verifier for MockVerifier {
    async fn verify_many(
        &self,
        _query: &str,
        documents: &[String],
    ) -> Result<Vec<f32>, VerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(VerifierError::Embedding(EmbeddingError::InferenceFailed {
                reason: "mock verifier failure".to_string(),
            }));
        }
        Ok(documents
            .iter()
            .map(|d| self.scores.get(d).copied().unwrap_or(self.default))
            .collect())
    }
}
