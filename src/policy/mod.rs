//! The three-gate confidence cascade.
//!
//! Each gate is a pure function over scores that were already computed. The
//! orchestrator in [`crate::retrieval`] calls them in order and stops at the first
//! rejection, so later (expensive) signals are never requested for a request that an
//! earlier gate has already turned away.
//!
//! Thresholds are inclusive and a NaN score never passes.

/// Gate thresholds.
pub mod config;
/// Decision and reason types.
pub mod types;


pub use config::GateConfig;
pub use types::{
    AcceptReason, Decision, GATEKEEPER_STATUS_ERROR, GATEKEEPER_STATUS_HEADER,
    GATEKEEPER_STATUS_HEALTHY, GATEKEEPER_STATUS_NOT_READY, GATEKEEPER_STATUS_READY, Gate,
    RejectReason,
};

use tracing::debug;

use crate::constants::GAP_TOLERANCE;
use crate::index::Candidate;
use crate::rerank::RerankScores;

/// `score >= threshold`; false for NaN.
#[inline]
pub fn passes(score: f32, threshold: f32) -> bool {
    score >= threshold
}

/// Gate 1. Returns the rank-1 coarse score when it clears the vector threshold.
pub fn coarse_gate(candidates: &[Candidate], config: &GateConfig) -> Result<f32, Decision> {
    let Some(best) = candidates.first() else {
        debug!("No candidates, rejecting at coarse gate");
        return Err(Decision::reject(RejectReason::LowCoarseRelevance));
    };

    if passes(best.coarse_score, config.vector_threshold) {
        Ok(best.coarse_score)
    } else {
        debug!(
            s1 = best.coarse_score,
            threshold = config.vector_threshold,
            "Coarse gate rejected"
        );
        Err(Decision::reject(RejectReason::LowCoarseRelevance))
    }
}

/// Gate 2. Returns `gap = v1 - v2` when `v1` clears the verification threshold.
///
/// A missing second candidate counts as `v2 = 0.0`.
pub fn verification_gate(
    v1: f32,
    v2: Option<f32>,
    config: &GateConfig,
) -> Result<f32, Decision> {
    if !passes(v1, config.verification_threshold) {
        debug!(
            v1,
            threshold = config.verification_threshold,
            "Verification gate rejected"
        );
        return Err(Decision::reject(RejectReason::LowTokenLevelMatch));
    }

    Ok(v1 - v2.unwrap_or(0.0))
}

/// `gap >= threshold` with [`GAP_TOLERANCE`] of slack; false for NaN.
#[inline]
pub fn is_clear_winner(gap: f32, threshold: f32) -> bool {
    gap + GAP_TOLERANCE >= threshold
}

/// Gate 3. `scores` is `None` when the reranker failed.
///
/// With a clear MaxSim winner (`gap >= verification_gap_threshold`) the reranker only
/// has to confirm rank 1. Otherwise the reranker's own top pick decides, and it needs
/// the stricter ambiguous threshold.
pub fn rerank_gate(
    candidates: &[Candidate],
    gap: f32,
    scores: Option<&RerankScores>,
    config: &GateConfig,
) -> Decision {
    let Some(scores) = scores else {
        return Decision::reject(RejectReason::RerankServiceUnavailable);
    };

    if is_clear_winner(gap, config.verification_gap_threshold) {
        let r1 = scores.score_for(0).unwrap_or(0.0);
        debug!(gap, r1, threshold = config.rerank_threshold, "Clear winner branch");

        return match candidates.first() {
            Some(best) if passes(r1, config.rerank_threshold) => Decision::Accepted {
                corpus_index: best.corpus_index,
                coarse_score: best.coarse_score,
                reason: AcceptReason::HighConfidenceConfirmation,
            },
            _ => Decision::reject(RejectReason::RerankerOverruled),
        };
    }

    let top = scores.top();
    debug!(
        gap,
        top_position = top.map(|(pos, _)| pos),
        top_score = top.map(|(_, score)| score),
        threshold = config.rerank_ambiguous_threshold,
        "Ambiguous branch"
    );

    match top.and_then(|(pos, score)| candidates.get(pos).map(|c| (c, score))) {
        Some((candidate, score)) if passes(score, config.rerank_ambiguous_threshold) => {
            Decision::Accepted {
                corpus_index: candidate.corpus_index,
                coarse_score: candidate.coarse_score,
                reason: AcceptReason::RerankerResolvedAmbiguity,
            }
        }
        _ => Decision::reject(RejectReason::InsufficientDiscrimination),
    }
}
