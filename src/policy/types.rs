use serde::Serialize;

pub const GATEKEEPER_STATUS_HEADER: &str = "X-Gatekeeper-Status";
pub const GATEKEEPER_STATUS_HEALTHY: &str = "healthy";
pub const GATEKEEPER_STATUS_READY: &str = "ready";
pub const GATEKEEPER_STATUS_NOT_READY: &str = "not_ready";
pub const GATEKEEPER_STATUS_ERROR: &str = "error";

/// The gate that rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Coarse,
    Verification,
    Rerank,
}

impl Gate {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Gate::Coarse => "coarse",
            Gate::Verification => "verification",
            Gate::Rerank => "rerank",
        }
    }

    /// `X-Gatekeeper-Status` value for a rejection at this gate.
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            Gate::Coarse => "ABSTAIN_COARSE",
            Gate::Verification => "ABSTAIN_VERIFICATION",
            Gate::Rerank => "ABSTAIN_RERANK",
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceptReason {
    /// Clear MaxSim winner confirmed by the reranker.
    HighConfidenceConfirmation,
    /// Ambiguous MaxSim result settled by a very high reranker score.
    RerankerResolvedAmbiguity,
}

impl AcceptReason {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptReason::HighConfidenceConfirmation => "high-confidence confirmation",
            AcceptReason::RerankerResolvedAmbiguity => "high reranker score resolves ambiguity",
        }
    }
}

impl std::fmt::Display for AcceptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    LowCoarseRelevance,
    LowTokenLevelMatch,
    RerankServiceUnavailable,
    /// The embedder failed mid-cascade. Reported at the rerank gate like any other
    /// collaborator failure.
    EmbeddingServiceUnavailable,
    RerankerOverruled,
    InsufficientDiscrimination,
}

impl RejectReason {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::LowCoarseRelevance => "low coarse relevance",
            RejectReason::LowTokenLevelMatch => "low token-level match",
            RejectReason::RerankServiceUnavailable => "rerank service unavailable",
            RejectReason::EmbeddingServiceUnavailable => "embedding service unavailable",
            RejectReason::RerankerOverruled => "reranker overruled fine-grained confidence",
            RejectReason::InsufficientDiscrimination => {
                "insufficient discrimination between top candidates"
            }
        }
    }

    #[inline]
    pub fn failed_gate(&self) -> Gate {
        match self {
            RejectReason::LowCoarseRelevance => Gate::Coarse,
            RejectReason::LowTokenLevelMatch => Gate::Verification,
            RejectReason::RerankServiceUnavailable
            | RejectReason::EmbeddingServiceUnavailable
            | RejectReason::RerankerOverruled
            | RejectReason::InsufficientDiscrimination => Gate::Rerank,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the cascade. Rejections are values, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accepted {
        corpus_index: usize,
        coarse_score: f32,
        reason: AcceptReason,
    },
    Rejected {
        reason: RejectReason,
        failed_gate: Gate,
    },
}

impl Decision {
    /// Builds a rejection whose gate is derived from the reason.
    pub fn reject(reason: RejectReason) -> Self {
        Decision::Rejected {
            reason,
            failed_gate: reason.failed_gate(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted { .. })
    }

    pub fn corpus_index(&self) -> Option<usize> {
        match self {
            Decision::Accepted { corpus_index, .. } => Some(*corpus_index),
            Decision::Rejected { .. } => None,
        }
    }

    pub fn reason_str(&self) -> &'static str {
        match self {
            Decision::Accepted { reason, .. } => reason.as_str(),
            Decision::Rejected { reason, .. } => reason.as_str(),
        }
    }

    pub fn failed_gate(&self) -> Option<Gate> {
        match self {
            Decision::Accepted { .. } => None,
            Decision::Rejected { failed_gate, .. } => Some(*failed_gate),
        }
    }

    /// `X-Gatekeeper-Status` value for this decision.
    pub fn as_header_value(&self) -> &'static str {
        match self {
            Decision::Accepted { .. } => "MATCHED",
            Decision::Rejected { failed_gate, .. } => failed_gate.as_header_value(),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Accepted {
                corpus_index,
                coarse_score,
                reason,
            } => write!(
                f,
                "ACCEPTED #{} (coarse: {:.4}, {})",
                corpus_index, coarse_score, reason
            ),
            Decision::Rejected {
                reason,
                failed_gate,
            } => write!(f, "REJECTED at {} ({})", failed_gate, reason),
        }
    }
}
