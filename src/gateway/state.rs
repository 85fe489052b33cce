use std::sync::Arc;

use crate::retrieval::RetrievalService;

use super::error::GatewayError;

/// Shared handler state. `service` is `None` when startup failed; every retrieval then
/// answers 503 with `init_error`.
#[derive(Clone)]
pub struct HandlerState {
    service: Option<Arc<RetrievalService>>,
    init_error: Option<Arc<str>>,
}

impl HandlerState {
    pub fn ready(service: Arc<RetrievalService>) -> Self {
        Self {
            service: Some(service),
            init_error: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self {
            service: None,
            init_error: Some(Arc::from(reason)),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.service.is_some()
    }

    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    pub fn service(&self) -> Result<&Arc<RetrievalService>, GatewayError> {
        self.service.as_ref().ok_or_else(|| {
            GatewayError::NotInitialized(
                self.init_error
                    .as_deref()
                    .unwrap_or("models or data not loaded")
                    .to_string(),
            )
        })
    }
}
