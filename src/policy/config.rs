use crate::config::{ConfigError, parse_number_from_env};
use crate::constants::{
    DEFAULT_RERANK_AMBIGUOUS_THRESHOLD, DEFAULT_RERANK_THRESHOLD, DEFAULT_TOP_K,
    DEFAULT_VECTOR_THRESHOLD, DEFAULT_VERIFICATION_GAP_THRESHOLD, DEFAULT_VERIFICATION_THRESHOLD,
};

/// Thresholds for the three gates plus the coarse candidate count.
///
/// Every threshold is inclusive: a score passes when `score >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Gate 1: minimum rank-1 cosine score.
    pub vector_threshold: f32,
    /// Gate 2: minimum MaxSim score of rank 1.
    pub verification_threshold: f32,
    /// Gate 3 branch point: `v1 - v2` at or above this is a clear winner.
    pub verification_gap_threshold: f32,
    /// Gate 3, clear-winner branch: minimum reranker score of rank 1.
    pub rerank_threshold: f32,
    /// Gate 3, ambiguous branch: minimum score of the reranker's own top pick.
    pub rerank_ambiguous_threshold: f32,
    /// Candidates returned by coarse retrieval.
    pub top_k: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            vector_threshold: DEFAULT_VECTOR_THRESHOLD,
            verification_threshold: DEFAULT_VERIFICATION_THRESHOLD,
            verification_gap_threshold: DEFAULT_VERIFICATION_GAP_THRESHOLD,
            rerank_threshold: DEFAULT_RERANK_THRESHOLD,
            rerank_ambiguous_threshold: DEFAULT_RERANK_AMBIGUOUS_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl GateConfig {
    const ENV_VECTOR_THRESHOLD: &'static str = "GATEKEEPER_VECTOR_THRESHOLD";
    const ENV_VERIFICATION_THRESHOLD: &'static str = "GATEKEEPER_VERIFICATION_THRESHOLD";
    const ENV_VERIFICATION_GAP_THRESHOLD: &'static str = "GATEKEEPER_VERIFICATION_GAP_THRESHOLD";
    const ENV_RERANK_THRESHOLD: &'static str = "GATEKEEPER_RERANK_THRESHOLD";
    const ENV_RERANK_AMBIGUOUS_THRESHOLD: &'static str = "GATEKEEPER_RERANK_AMBIGUOUS_THRESHOLD";
    const ENV_TOP_K: &'static str = "GATEKEEPER_TOP_K";

    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let config = Self {
            vector_threshold: parse_number_from_env(
                Self::ENV_VECTOR_THRESHOLD,
                d.vector_threshold,
            )?,
            verification_threshold: parse_number_from_env(
                Self::ENV_VERIFICATION_THRESHOLD,
                d.verification_threshold,
            )?,
            verification_gap_threshold: parse_number_from_env(
                Self::ENV_VERIFICATION_GAP_THRESHOLD,
                d.verification_gap_threshold,
            )?,
            rerank_threshold: parse_number_from_env(
                Self::ENV_RERANK_THRESHOLD,
                d.rerank_threshold,
            )?,
            rerank_ambiguous_threshold: parse_number_from_env(
                Self::ENV_RERANK_AMBIGUOUS_THRESHOLD,
                d.rerank_ambiguous_threshold,
            )?,
            top_k: parse_number_from_env(Self::ENV_TOP_K, d.top_k)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(Self::ENV_VECTOR_THRESHOLD, self.vector_threshold, -1.0, 1.0)?;
        check_range(
            Self::ENV_VERIFICATION_THRESHOLD,
            self.verification_threshold,
            0.0,
            1.0,
        )?;
        check_range(
            Self::ENV_VERIFICATION_GAP_THRESHOLD,
            self.verification_gap_threshold,
            0.0,
            1.0,
        )?;
        check_range(Self::ENV_RERANK_THRESHOLD, self.rerank_threshold, 0.0, 1.0)?;
        check_range(
            Self::ENV_RERANK_AMBIGUOUS_THRESHOLD,
            self.rerank_ambiguous_threshold,
            0.0,
            1.0,
        )?;

        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TOP_K,
                value: "0".to_string(),
                reason: "top_k must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn with_vector_threshold(mut self, value: f32) -> Self {
        self.vector_threshold = value;
        self
    }

    pub fn with_verification_threshold(mut self, value: f32) -> Self {
        self.verification_threshold = value;
        self
    }

    pub fn with_verification_gap_threshold(mut self, value: f32) -> Self {
        self.verification_gap_threshold = value;
        self
    }

    pub fn with_rerank_threshold(mut self, value: f32) -> Self {
        self.rerank_threshold = value;
        self
    }

    pub fn with_rerank_ambiguous_threshold(mut self, value: f32) -> Self {
        self.rerank_ambiguous_threshold = value;
        self
    }

    pub fn with_top_k(mut self, value: usize) -> Self {
        self.top_k = value;
        self
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: format!("must be within [{}, {}]", min, max),
        })
    }
}
