use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::Reranker;
use super::error::RerankError;
use super::types::{RerankResult, RerankScores};

enum MockBehavior {
    Scores(Vec<f32>),
    Timeout,
    Malformed,
}

/// Scripted reranker for tests. Counts calls and records the last query.
pub struct MockReranker {
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_query: Mutex<Option<String>>,
}

impl MockReranker {
    /// Returns `scores[i]` for document `i`; positions past the end stay unscored.
    pub fn with_scores(scores: Vec<f32>) -> Self {
        Self::from_behavior(MockBehavior::Scores(scores))
    }

    pub fn timing_out() -> Self {
        Self::from_behavior(MockBehavior::Timeout)
    }

    pub fn malformed() -> Self {
        Self::from_behavior(MockBehavior::Malformed)
    }

    fn from_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }
}

#[async_trait]
impl Reranker for MockReranker {
    async fn rerank(&self, query: &str, documents: &[String]) -> Result<RerankScores, RerankError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(query.to_string());
        }

        match &self.behavior {
            MockBehavior::Scores(scores) => {
                let dense: Vec<f32> = scores.iter().copied().take(documents.len()).collect();
                let results: Vec<_> = dense
                    .into_iter()
                    .enumerate()
                    .map(|(index, relevance_score)| RerankResult {
                        index,
                        relevance_score,
                    })
                    .collect();
                RerankScores::from_results(&results, documents.len())
            }
            MockBehavior::Timeout => Err(RerankError::Timeout { timeout_ms: 0 }),
            MockBehavior::Malformed => Err(RerankError::Malformed {
                reason: "mock malformed response".to_string(),
            }),
        }
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
