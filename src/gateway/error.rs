use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::policy::GATEKEEPER_STATUS_HEADER;
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("service not initialized: {0}")]
    NotInitialized(String),

    #[error("retrieval failed: {0}")]
    RetrievalFailed(RetrievalError),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<RetrievalError> for GatewayError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::TaskFailed { reason } => GatewayError::InternalError(reason),
            other => GatewayError::RetrievalFailed(other),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, gatekeeper_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotInitialized(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_ready"),
            GatewayError::RetrievalFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "retrieval_error")
            }
            GatewayError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            GATEKEEPER_STATUS_HEADER,
            HeaderValue::from_static(gatekeeper_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
