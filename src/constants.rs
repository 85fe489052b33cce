//! Cross-cutting, shared constants.
//!
//! Gate thresholds live here as defaults only; the values actually used at runtime travel
//! through [`GateConfig`](crate::policy::GateConfig).
//!
//! # Dimension Invariants
//!
//! The corpus matrix, the query embedder and the token embedder must agree on a single
//! dimension. Use [`validate_embedding_dim`] at module boundaries to catch mismatches at
//! startup instead of deep inside a request.

pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

pub const DEFAULT_TOP_K: usize = 5;

/// Gate 1: minimum coarse (cosine) score of the rank-1 candidate.
pub const DEFAULT_VECTOR_THRESHOLD: f32 = 0.40;

/// Gate 2: minimum MaxSim score of the rank-1 candidate.
pub const DEFAULT_VERIFICATION_THRESHOLD: f32 = 0.80;

/// Gate 2/3: minimum MaxSim gap between rank 1 and rank 2 to count as a clear winner.
pub const DEFAULT_VERIFICATION_GAP_THRESHOLD: f32 = 0.04;

/// Slack on the gap comparison. `v1 - v2` in `f32` lands a few ULPs under a
/// nominally equal threshold (`0.90 - 0.86` is `0.03999996`).
pub const GAP_TOLERANCE: f32 = 1e-6;

/// Gate 3 (clear winner): minimum reranker score for the rank-1 position.
pub const DEFAULT_RERANK_THRESHOLD: f32 = 0.85;

/// Gate 3 (ambiguous): minimum reranker score for the reranker's own top pick.
pub const DEFAULT_RERANK_AMBIGUOUS_THRESHOLD: f32 = 0.95;

/// Tolerance used when checking that stored vectors are unit-norm.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-3;

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use gatekeeper::constants::validate_embedding_dim;
///
/// // The query embedder must produce vectors the corpus matrix can score.
/// validate_embedding_dim(1024, 1024).unwrap();
/// assert!(validate_embedding_dim(768, 1024).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 || actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
