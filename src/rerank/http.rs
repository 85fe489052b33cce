//! Client for an external `/v1/rerank` service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::Reranker;
use super::error::RerankError;
use super::types::{RerankRequest, RerankResponse, RerankScores};

/// Prefix prepended to every query before it is sent to the reranker.
pub const DEFAULT_INSTRUCTION: &str = "Task: Rigorously evaluate the semantic match between the User Query and the Document.\nUser Query: ";

const MAX_ERROR_BODY: usize = 512;

pub struct HttpReranker {
    http: HttpClient,
    endpoint: String,
    model: String,
    timeout: Duration,
    instruction: String,
}

impl std::fmt::Debug for HttpReranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReranker")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpReranker {
    /// `base_url` is the service root; requests go to `{base_url}/v1/rerank`.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RerankError> {
        let base = base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(RerankError::InvalidConfig {
                reason: "base url cannot be empty".to_string(),
            });
        }
        if timeout.is_zero() {
            return Err(RerankError::InvalidConfig {
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RerankError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/v1/rerank", base),
            model: model.into(),
            timeout,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        })
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn timeout_error(&self) -> RerankError {
        RerankError::Timeout {
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }

    async fn send(&self, query: &str, documents: &[String]) -> Result<RerankScores, RerankError> {
        let refined_query = format!("{}{}", self.instruction, query);
        let body = RerankRequest {
            model: &self.model,
            query: &refined_query,
            documents,
            top_n: documents.len(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timeout_error()
                } else {
                    RerankError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(RerankError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                RerankError::from(e)
            }
        })?;

        let parsed: RerankResponse =
            serde_json::from_slice(&bytes).map_err(|e| RerankError::Malformed {
                reason: e.to_string(),
            })?;

        RerankScores::from_results(&parsed.results, documents.len())
    }
}

#[async_trait]
impl Reranker for HttpReranker {
    async fn rerank(&self, query: &str, documents: &[String]) -> Result<RerankScores, RerankError> {
        debug!(
            endpoint = %self.endpoint,
            num_documents = documents.len(),
            "Sending rerank request"
        );

        let scores = match tokio::time::timeout(self.timeout, self.send(query, documents)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error()),
        };

        match &scores {
            Ok(scores) if scores.scored() < scores.len() => {
                warn!(
                    scored = scores.scored(),
                    submitted = scores.len(),
                    "Rerank service omitted some documents"
                );
            }
            Err(e) => warn!(error = %e, "Rerank request failed"),
            _ => {}
        }

        scores
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
