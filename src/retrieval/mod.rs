//! Request orchestration: translate, embed, retrieve, then run the gate cascade.

pub mod bootstrap;
pub mod error;


pub use bootstrap::{STUB_INDEX_DIM, build_matrix, build_service, load_embedder};
pub use error::RetrievalError;

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants::validate_embedding_dim;
use crate::corpus::{Corpus, CorpusEntry, CorpusError};
use crate::embedding::Embedder;
use crate::index::{Candidate, CoarseRetriever, EmbeddingMatrix, SimilarityIndex};
use crate::policy::{self, Decision, GateConfig, RejectReason};
use crate::rerank::Reranker;
use crate::translate::{NoopTranslator, Translator, translate_if_needed};
use crate::verify::{Verifier, VerifierError};

/// Result of one retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOutcome {
    pub decision: Decision,
    /// Rank-1 coarse score, `0.0` when there were no candidates.
    pub best_score: f32,
    /// The accepted entry, if any.
    pub entry: Option<CorpusEntry>,
}

/// Process-wide, read-only retrieval state. Share it behind an `Arc`.
pub struct RetrievalService {
    corpus: Corpus,
    retriever: CoarseRetriever,
    embedder: Arc<dyn Embedder>,
    verifier: Arc<dyn Verifier>,
    reranker: Arc<dyn Reranker>,
    translator: Arc<dyn Translator>,
    gate: GateConfig,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("corpus_len", &self.corpus.len())
            .field("dim", &self.retriever.index().dim())
            .field("embedder_stub", &self.embedder.is_stub())
            .field("reranker", &self.reranker.backend_name())
            .field("gate", &self.gate)
            .finish()
    }
}

impl RetrievalService {
    /// Checks that corpus, matrix and embedder agree before anything is served.
    pub fn new(
        corpus: Corpus,
        matrix: EmbeddingMatrix,
        embedder: Arc<dyn Embedder>,
        verifier: Arc<dyn Verifier>,
        reranker: Arc<dyn Reranker>,
        gate: GateConfig,
    ) -> Result<Self, RetrievalError> {
        gate.validate()?;

        if corpus.is_empty() {
            return Err(CorpusError::Empty.into());
        }
        if corpus.len() != matrix.len() {
            return Err(CorpusError::MatrixMismatch {
                corpus: corpus.len(),
                matrix: matrix.len(),
            }
            .into());
        }
        validate_embedding_dim(embedder.embedding_dim(), matrix.dim())?;

        let retriever = CoarseRetriever::new(SimilarityIndex::new(matrix), gate.top_k);

        info!(
            corpus_len = corpus.len(),
            dim = retriever.index().dim(),
            top_k = gate.top_k,
            embedder_stub = embedder.is_stub(),
            reranker = reranker.backend_name(),
            "Retrieval service initialized"
        );

        Ok(Self {
            corpus,
            retriever,
            embedder,
            verifier,
            reranker,
            translator: Arc::new(NoopTranslator),
            gate,
        })
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn gate(&self) -> &GateConfig {
        &self.gate
    }

    pub fn embedder_is_stub(&self) -> bool {
        self.embedder.is_stub()
    }

    pub fn reranker_backend(&self) -> &'static str {
        self.reranker.backend_name()
    }

    /// Runs one request through the cascade.
    ///
    /// Gate rejections come back as `Ok` with a rejected [`Decision`], and so do embedder
    /// and reranker failures (as rerank-gate rejections). The verifier is only called
    /// once Gate 1 passes and the reranker only once Gate 2 passes.
    #[tracing::instrument(
        skip(self, text),
        fields(request_id = %Uuid::new_v4(), text_len = text.len())
    )]
    pub async fn retrieve(&self, text: &str) -> Result<RetrievalOutcome, RetrievalError> {
        let query = translate_if_needed(self.translator.as_ref(), text).await;

        let embedder = Arc::clone(&self.embedder);
        let to_embed = query.clone();
        let embedded = tokio::task::spawn_blocking(move || embedder.embed(&to_embed))
            .await
            .map_err(|e| RetrievalError::TaskFailed {
                reason: e.to_string(),
            })?;
        let vector = match embedded {
            Ok(vector) => vector,
            Err(e) => {
                warn!(error = %e, "Query embedding failed");
                return Ok(RetrievalOutcome {
                    decision: Decision::reject(RejectReason::EmbeddingServiceUnavailable),
                    best_score: 0.0,
                    entry: None,
                });
            }
        };

        let candidates = self.retriever.retrieve(&vector)?;
        let best_score = candidates.first().map_or(0.0, |c| c.coarse_score);

        let decision = self.decide(&query, &candidates).await?;
        let entry = match decision.corpus_index() {
            Some(index) => Some(self.entry(index)?.clone()),
            None => None,
        };

        info!(
            best_score,
            decision = %decision,
            "Retrieval decided"
        );

        Ok(RetrievalOutcome {
            decision,
            best_score,
            entry,
        })
    }

    async fn decide(
        &self,
        query: &str,
        candidates: &[Candidate],
    ) -> Result<Decision, RetrievalError> {
        if let Err(rejection) = policy::coarse_gate(candidates, &self.gate) {
            return Ok(rejection);
        }

        let top_two = self.documents(&candidates[..candidates.len().min(2)])?;
        let verification = match self.verifier.verify_many(query, &top_two).await {
            Ok(scores) => scores,
            Err(VerifierError::Embedding(e)) => {
                warn!(error = %e, "Token embedding failed during verification");
                return Ok(Decision::reject(RejectReason::EmbeddingServiceUnavailable));
            }
            Err(e) => return Err(e.into()),
        };
        let v1 = verification.first().copied().unwrap_or(0.0);
        let v2 = verification.get(1).copied();
        debug!(v1, v2, "Verification scores");

        let gap = match policy::verification_gate(v1, v2, &self.gate) {
            Ok(gap) => gap,
            Err(rejection) => return Ok(rejection),
        };

        let documents = self.documents(candidates)?;
        let scores = match self.reranker.rerank(query, &documents).await {
            Ok(scores) => Some(scores),
            Err(e) => {
                warn!(error = %e, backend = self.reranker.backend_name(), "Reranker unavailable");
                None
            }
        };

        Ok(policy::rerank_gate(
            candidates,
            gap,
            scores.as_ref(),
            &self.gate,
        ))
    }

    fn entry(&self, index: usize) -> Result<&CorpusEntry, RetrievalError> {
        self.corpus
            .get(index)
            .ok_or(RetrievalError::MissingEntry { index })
    }

    /// Texts the verifier and reranker compare against, in candidate order.
    fn documents(&self, candidates: &[Candidate]) -> Result<Vec<String>, RetrievalError> {
        candidates
            .iter()
            .map(|c| self.entry(c.corpus_index).map(|e| e.query_text.clone()))
            .collect()
    }
}
