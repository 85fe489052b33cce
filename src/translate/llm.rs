use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest};

use super::{TranslateError, Translator};

const SYSTEM_PROMPT: &str = "Translate the user's text into English. \
Reply with the translation only, without quotes, notes or explanations.";

pub const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_secs(15);

/// Chat-model translator. Provider and credentials are resolved by `genai` from the
/// model name and the usual provider environment variables.
#[derive(Clone)]
pub struct LlmTranslator {
    client: Client,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for LlmTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmTranslator")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmTranslator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
            timeout: DEFAULT_TRANSLATE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(text),
        ]);

        let response = tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(self.model.as_str(), request, None),
        )
        .await
        .map_err(|_| TranslateError::Timeout {
            timeout_ms: self.timeout.as_millis() as u64,
        })?
        .map_err(|e| TranslateError::Provider {
            reason: e.to_string(),
        })?;

        let translated = response.first_text().unwrap_or_default().trim().to_string();
        if translated.is_empty() {
            return Err(TranslateError::EmptyOutput);
        }
        Ok(translated)
    }
}
