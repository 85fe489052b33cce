use serde::{Deserialize, Serialize};

use super::error::RerankError;

/// Body sent to a `/v1/rerank` endpoint (vLLM, Jina and Cohere share this shape).
#[derive(Debug, Clone, Serialize)]
pub struct RerankRequest<'a> {
    pub model: &'a str,
    pub query: &'a str,
    pub documents: &'a [String],
    pub top_n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RerankResult {
    /// Position of the document in the submitted list.
    pub index: usize,
    pub relevance_score: f32,
}

/// Only `results` is read; other fields (`id`, `usage`, echoed documents) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RerankResponse {
    pub results: Vec<RerankResult>,
}

/// Reranker scores keyed by original candidate position.
///
/// Positions the service did not score are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RerankScores {
    scores: Vec<Option<f32>>,
}

impl RerankScores {
    /// Validates results against the number of submitted documents.
    ///
    /// Rejects out-of-range or duplicate indices and scores outside `[0, 1]`.
    pub fn from_results(
        results: &[RerankResult],
        num_documents: usize,
    ) -> Result<Self, RerankError> {
        let mut scores = vec![None; num_documents];

        for result in results {
            let slot = scores
                .get_mut(result.index)
                .ok_or_else(|| RerankError::Malformed {
                    reason: format!(
                        "index {} out of range for {} documents",
                        result.index, num_documents
                    ),
                })?;

            if slot.is_some() {
                return Err(RerankError::Malformed {
                    reason: format!("duplicate index {}", result.index),
                });
            }

            *slot = Some(check_score(result.index, result.relevance_score)?);
        }

        Ok(Self { scores })
    }

    /// One score per document, in submission order.
    pub fn from_dense(scores: Vec<f32>) -> Result<Self, RerankError> {
        let scores = scores
            .into_iter()
            .enumerate()
            .map(|(pos, score)| check_score(pos, score).map(Some))
            .collect::<Result<_, _>>()?;
        Ok(Self { scores })
    }

    pub fn score_for(&self, position: usize) -> Option<f32> {
        self.scores.get(position).copied().flatten()
    }

    /// Highest-scored position. Ties go to the lowest position.
    pub fn top(&self) -> Option<(usize, f32)> {
        self.scores
            .iter()
            .enumerate()
            .filter_map(|(pos, score)| score.map(|s| (pos, s)))
            .fold(None, |best, (pos, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((pos, score)),
            })
    }

    /// Number of submitted documents.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Number of positions that received a score.
    pub fn scored(&self) -> usize {
        self.scores.iter().filter(|s| s.is_some()).count()
    }
}

/// Relevance scores are probabilities. Raw logits are refused rather than compared
/// against probability thresholds.
fn check_score(index: usize, score: f32) -> Result<f32, RerankError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(RerankError::Malformed {
            reason: format!("score {} for index {} is outside [0, 1]", score, index),
        })
    }
}
