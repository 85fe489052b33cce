//! HTTP gateway (Axum): `/retrieve` plus health and readiness probes.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::retrieve_handler;
pub use payload::{RetrieveRequest, RetrieveResponse};
pub use state::HandlerState;

use crate::policy::{
    GATEKEEPER_STATUS_ERROR, GATEKEEPER_STATUS_HEADER, GATEKEEPER_STATUS_HEALTHY,
    GATEKEEPER_STATUS_NOT_READY, GATEKEEPER_STATUS_READY,
};

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/retrieve", post(retrieve_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub corpus: &'static str,
    pub corpus_size: usize,
    pub embedder_mode: &'static str,
    pub reranker: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        GATEKEEPER_STATUS_HEADER,
        HeaderValue::from_static(GATEKEEPER_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let (status_code, status_msg, header, components) = match state.service() {
        Ok(service) => (
            StatusCode::OK,
            "ok",
            GATEKEEPER_STATUS_READY,
            ComponentStatus {
                http: GATEKEEPER_STATUS_READY,
                corpus: GATEKEEPER_STATUS_READY,
                corpus_size: service.corpus().len(),
                embedder_mode: if service.embedder_is_stub() {
                    "stub"
                } else {
                    "real"
                },
                reranker: service.reranker_backend(),
            },
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            GATEKEEPER_STATUS_NOT_READY,
            ComponentStatus {
                http: GATEKEEPER_STATUS_READY,
                corpus: GATEKEEPER_STATUS_ERROR,
                corpus_size: 0,
                embedder_mode: "none",
                reranker: "none",
            },
        ),
    };

    let mut headers = HeaderMap::new();
    headers.insert(GATEKEEPER_STATUS_HEADER, HeaderValue::from_static(header));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
            error: state.init_error().map(str::to_string),
        }),
    )
        .into_response()
}
