use serde::{Deserialize, Serialize};

use crate::retrieval::RetrievalOutcome;

#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveRequest {
    pub text: String,
}

/// `/retrieve` response body.
///
/// On a match `document`/`title`/`id` identify the accepted entry and `score` is the
/// rank-1 coarse score. On abstention they are empty, `score` is still the best coarse
/// score, and `status` carries the rejection reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub document: String,
    pub title: String,
    pub score: f32,
    pub id: String,
    pub matched: bool,
    pub status: String,
}

impl From<RetrievalOutcome> for RetrieveResponse {
    fn from(outcome: RetrievalOutcome) -> Self {
        let status = outcome.decision.reason_str().to_string();
        match outcome.entry {
            Some(entry) if outcome.decision.is_accepted() => Self {
                document: entry.answer_text,
                title: entry.query_text,
                score: outcome.best_score,
                id: entry.id.to_string(),
                matched: true,
                status,
            },
            _ => Self {
                document: String::new(),
                title: String::new(),
                score: outcome.best_score,
                id: String::new(),
                matched: false,
                status,
            },
        }
    }
}
