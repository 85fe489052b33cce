use std::sync::Arc;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use super::Verifier;
use super::error::VerifierError;
use crate::embedding::{Embedder, TokenEmbeddings};
use crate::hashing::pair_key;
use crate::index::dot;

/// Late-interaction score: for each query token, the best cosine against any document
/// token, averaged over query tokens.
///
/// Both inputs must hold unit-norm rows. Either side empty scores `0.0`. The result is
/// clamped to `[0, 1]`.
pub fn max_sim(query: &TokenEmbeddings, document: &TokenEmbeddings) -> f32 {
    if query.is_empty() || document.is_empty() || query.dim() != document.dim() {
        return 0.0;
    }

    let total: f32 = query
        .rows()
        .map(|q| {
            document
                .rows()
                .map(|d| dot(q, d))
                .fold(f32::NEG_INFINITY, f32::max)
        })
        .sum();

    (total / query.len() as f32).clamp(0.0, 1.0)
}

/// MaxSim verifier over an [`Embedder`]'s token embeddings, with an optional score cache.
#[derive(Clone)]
pub struct MaxSimVerifier {
    embedder: Arc<dyn Embedder>,
    cache: Option<Cache<u64, f32>>,
}

impl std::fmt::Debug for MaxSimVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaxSimVerifier")
            .field("embedding_dim", &self.embedder.embedding_dim())
            .field("cached", &self.cached_entries())
            .finish()
    }
}

impl MaxSimVerifier {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            cache: None,
        }
    }

    /// Caches up to `capacity` pair scores. `0` disables caching.
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache = (capacity > 0).then(|| Cache::builder().max_capacity(capacity).build());
        self
    }

    pub fn cached_entries(&self) -> u64 {
        self.cache.as_ref().map_or(0, |c| {
            c.run_pending_tasks();
            c.entry_count()
        })
    }

    fn cached(&self, query: &str, document: &str) -> Option<f32> {
        self.cache.as_ref()?.get(&pair_key(query, document))
    }
}

#[async_trait]
impl Verifier for MaxSimVerifier {
    async fn verify_many(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<f32>, VerifierError> {
        let mut scores: Vec<Option<f32>> =
            documents.iter().map(|d| self.cached(query, d)).collect();

        let missing: Vec<(usize, String)> = scores
            .iter()
            .zip(documents)
            .enumerate()
            .filter(|(_, (score, _))| score.is_none())
            .map(|(i, (_, doc))| (i, doc.clone()))
            .collect();

        if !missing.is_empty() {
            debug!(
                hits = documents.len() - missing.len(),
                misses = missing.len(),
                "Computing MaxSim scores"
            );

            let embedder = Arc::clone(&self.embedder);
            let query_owned = query.to_string();
            let computed = tokio::task::spawn_blocking(move || {
                let query_tokens = embedder.embed_tokens(&query_owned)?;
                missing
                    .into_iter()
                    .map(|(i, doc)| {
                        let doc_tokens = embedder.embed_tokens(&doc)?;
                        let score = max_sim(&query_tokens, &doc_tokens);
                        Ok::<_, VerifierError>((i, doc, score))
                    })
                    .collect::<Result<Vec<_>, VerifierError>>()
            })
            .await
            .map_err(|e| VerifierError::TaskFailed {
                reason: e.to_string(),
            })??;

            for (i, doc, score) in computed {
                if let Some(cache) = &self.cache {
                    cache.insert(pair_key(query, &doc), score);
                }
                scores[i] = Some(score);
            }
        }

        Ok(scores.into_iter().map(|s| s.unwrap_or(0.0)).collect())
    }
}
