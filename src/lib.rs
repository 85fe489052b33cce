//! Gatekeeper library crate (used by the server binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`RetrievalService`], [`RetrievalOutcome`] - The gated retrieval cascade
//! - [`Decision`], [`GateConfig`] - Gate policy and its thresholds
//!
//! ## Data
//! - [`Corpus`], [`CorpusEntry`] - Question/answer records
//! - [`EmbeddingMatrix`], [`SimilarityIndex`] - Coarse top-k retrieval
//!
//! ## Models & Adapters
//! - [`BertEmbedder`] - Pooled and per-token embeddings
//! - [`MaxSimVerifier`] - Token-level verification (Gate 2)
//! - [`HttpReranker`], [`CrossEncoderReranker`] - Reranking (Gate 3)
//! - [`LlmTranslator`] - Best-effort translation of non-Latin queries
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod index;
pub mod policy;
pub mod rerank;
pub mod retrieval;
pub mod translate;
pub mod verify;

pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use corpus::{Corpus, CorpusEntry, CorpusError};
pub use embedding::{
    BertEmbedder, CrossEncoder, CrossEncoderConfig, Embedder, EmbeddingError, EncoderConfig,
    TokenEmbeddings,
};
pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use hashing::{hash_to_u64, pair_key};
pub use index::{Candidate, CoarseRetriever, EmbeddingMatrix, IndexError, SimilarityIndex};
pub use policy::{AcceptReason, Decision, GATEKEEPER_STATUS_HEADER, Gate, GateConfig, RejectReason};
pub use rerank::{CrossEncoderReranker, HttpReranker, RerankError, RerankScores, Reranker};
#[cfg(any(test, feature = "mock"))]
pub use rerank::MockReranker;
pub use retrieval::{RetrievalError, RetrievalOutcome, RetrievalService, build_service};
pub use translate::{LlmTranslator, NoopTranslator, TranslateError, Translator};
#[cfg(any(test, feature = "mock"))]
pub use translate::MockTranslator;
pub use verify::{MaxSimVerifier, Verifier, VerifierError, max_sim};
#[cfg(any(test, feature = "mock"))]
pub use verify::MockVerifier;
