//! Reranker adapters.
//!
//! A [`Reranker`] scores every coarse candidate against the query and reports the
//! scores by original candidate position ([`RerankScores`]). Three backends:
//!
//! - [`HttpReranker`]: an external `/v1/rerank` service.
//! - [`CrossEncoderReranker`]: the in-process candle cross-encoder.
//! - `MockReranker`: scripted scores or failures (tests, `mock` feature).

pub mod error;
pub mod http;
pub mod local;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;


pub use error::RerankError;
pub use http::{DEFAULT_INSTRUCTION, HttpReranker};
pub use local::CrossEncoderReranker;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockReranker;
pub use types::{RerankRequest, RerankResponse, RerankResult, RerankScores};

use async_trait::async_trait;

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Scores `documents` against `query`. The result has one slot per document.
    async fn rerank(&self, query: &str, documents: &[String]) -> Result<RerankScores, RerankError>;

    /// Short name reported by `/ready`.
    fn backend_name(&self) -> &'static str;
}
