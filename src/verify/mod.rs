//! Fine-grained (token-level) verification of coarse candidates.

pub mod error;
pub mod maxsim;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use error::VerifierError;
pub use maxsim::{MaxSimVerifier, max_sim};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVerifier;

use async_trait::async_trait;

#[async_trait]
pub trait Verifier: Send + Sync {
    /// Scores each document against `query`, in input order.
    async fn verify_many(
        &self,
        query: &str,
        documents: &[String],
    ) -> Result<Vec<f32>, VerifierError>;

    async fn verify(&self, query: &str, document: &str) -> Result<f32, VerifierError> {
        let scores = self.verify_many(query, &[document.to_string()]).await?;
        Ok(scores.first().copied().unwrap_or(0.0))
    }
}
