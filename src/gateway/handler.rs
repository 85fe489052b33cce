use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use tracing::{error, instrument};

use super::error::GatewayError;
use super::payload::{RetrieveRequest, RetrieveResponse};
use super::state::HandlerState;
use crate::policy::GATEKEEPER_STATUS_HEADER;

#[instrument(skip(state, request))]
pub async fn retrieve_handler(
    State(state): State<HandlerState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let service = state.service()?;

    let request: RetrieveRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    if request.text.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "text must not be empty".to_string(),
        ));
    }

    let outcome = service.retrieve(&request.text).await.map_err(|e| {
        error!(error = %e, "Retrieval failed");
        GatewayError::from(e)
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        GATEKEEPER_STATUS_HEADER,
        HeaderValue::from_static(outcome.decision.as_header_value()),
    );

    Ok((headers, Json(RetrieveResponse::from(outcome))).into_response())
}
