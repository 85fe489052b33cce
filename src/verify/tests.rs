use super::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::embedding::{BertEmbedder, Embedder, EmbeddingError, TokenEmbeddings};

struct CountingEmbedder {
    inner: BertEmbedder,
    token_calls: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self {
            inner: BertEmbedder::stub(64).unwrap(),
            token_calls: AtomicUsize::new(0),
        }
    }
}

impl Embedder for CountingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.inner.embed(text)
    }

    fn embed_tokens(&self, text: &str) -> Result<TokenEmbeddings, EmbeddingError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_tokens(text)
    }

    fn embedding_dim(&self) -> usize {
        self.inner.embedding_dim()
    }
}

fn tokens(rows: &[&[f32]]) -> TokenEmbeddings {
    let dim = rows.first().map_or(0, |r| r.len());
    TokenEmbeddings::from_rows(rows.iter().map(|r| r.to_vec()).collect(), dim).unwrap()
}

#[test]
fn test_max_sim_identical_is_one() {
    let t = tokens(&[&[1.0, 0.0], &[0.0, 1.0]]);
    assert!((max_sim(&t, &t) - 1.0).abs() < 1e-6);
}

#[test]
fn test_max_sim_averages_per_query_token_best() {
    let query = tokens(&[&[1.0, 0.0], &[0.0, 1.0]]);
    let document = tokens(&[&[1.0, 0.0]]);
    assert!((max_sim(&query, &document) - 0.5).abs() < 1e-6);
}

#[test]
fn test_max_sim_is_asymmetric() {
    let query = tokens(&[&[1.0, 0.0]]);
    let document = tokens(&[&[1.0, 0.0], &[0.0, 1.0]]);
    assert!((max_sim(&query, &document) - 1.0).abs() < 1e-6);
    assert!((max_sim(&document, &query) - 0.5).abs() < 1e-6);
}

#[test]
fn test_max_sim_empty_side_is_zero() {
    let t = tokens(&[&[1.0, 0.0]]);
    let empty = TokenEmbeddings::empty(2);
    assert_eq!(max_sim(&t, &empty), 0.0);
    assert_eq!(max_sim(&empty, &t), 0.0);
}

#[test]
fn test_max_sim_clamped_to_unit_interval() {
    let query = tokens(&[&[1.0, 0.0]]);
    let document = tokens(&[&[-1.0, 0.0]]);
    assert_eq!(max_sim(&query, &document), 0.0);
}

#[tokio::test]
async fn test_verifier_identical_text_scores_one() {
    let verifier = MaxSimVerifier::new(Arc::new(BertEmbedder::stub(64).unwrap()));
    let text = "How to replace the Nook HD battery?";
    let score = verifier.verify(text, text).await.unwrap();
    assert!(score > 0.999, "score was {}", score);
}

#[tokio::test]
async fn test_verifier_partial_overlap_below_full() {
    let verifier = MaxSimVerifier::new(Arc::new(BertEmbedder::stub(64).unwrap()));
    let full = verifier
        .verify("nook battery", "nook battery replacement")
        .await
        .unwrap();
    let partial = verifier.verify("nook battery", "battery").await.unwrap();

    assert!(full > 0.999);
    assert!(partial < full);
    assert!((0.0..=1.0).contains(&partial));
}

#[tokio::test]
async fn test_verify_many_preserves_order() {
    let verifier = MaxSimVerifier::new(Arc::new(BertEmbedder::stub(64).unwrap()));
    let documents = vec!["gpu repair".to_string(), "keyboard replacement".to_string()];

    let scores = verifier
        .verify_many("keyboard replacement", &documents)
        .await
        .unwrap();

    assert_eq!(scores.len(), 2);
    assert!(scores[1] > scores[0]);
}

#[tokio::test]
async fn test_verifier_cache_skips_recomputation() {
    let embedder = Arc::new(CountingEmbedder::new());
    let verifier = MaxSimVerifier::new(embedder.clone()).with_cache_capacity(100);
    let documents = vec!["doc one".to_string(), "doc two".to_string()];

    let first = verifier.verify_many("query", &documents).await.unwrap();
    // query once + two documents
    assert_eq!(embedder.token_calls.load(Ordering::SeqCst), 3);

    let second = verifier.verify_many("query", &documents).await.unwrap();
    assert_eq!(embedder.token_calls.load(Ordering::SeqCst), 3);
    assert_eq!(first, second);
    assert_eq!(verifier.cached_entries(), 2);
}

#[tokio::test]
async fn test_verifier_cache_partial_hit() {
    let embedder = Arc::new(CountingEmbedder::new());
    let verifier = MaxSimVerifier::new(embedder.clone()).with_cache_capacity(100);

    verifier.verify("query", "doc one").await.unwrap();
    assert_eq!(embedder.token_calls.load(Ordering::SeqCst), 2);

    let documents = vec!["doc one".to_string(), "doc two".to_string()];
    verifier.verify_many("query", &documents).await.unwrap();
    assert_eq!(embedder.token_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_verifier_without_cache_recomputes() {
    let embedder = Arc::new(CountingEmbedder::new());
    let verifier = MaxSimVerifier::new(embedder.clone()).with_cache_capacity(0);

    verifier.verify("query", "doc").await.unwrap();
    verifier.verify("query", "doc").await.unwrap();

    assert_eq!(embedder.token_calls.load(Ordering::SeqCst), 4);
    assert_eq!(verifier.cached_entries(), 0);
}

#[tokio::test]
async fn test_mock_verifier() {
    let verifier = MockVerifier::new(0.1).with_score("a", 0.9);
    let scores = verifier
        .verify_many("q", &["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(scores, vec![0.9, 0.1]);
    assert_eq!(verifier.call_count(), 1);

    assert!(MockVerifier::failing().verify("q", "a").await.is_err());
}
