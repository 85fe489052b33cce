//! Best-effort query translation for non-Latin input.
//!
//! The corpus and models are English. Queries written in another script are translated
//! before embedding; any translation failure falls back to the original text.

pub mod llm;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use llm::LlmTranslator;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTranslator;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation provider failed: {reason}")]
    Provider { reason: String },

    #[error("translation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("translation returned empty output")]
    EmptyOutput,
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `text` to English.
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Identity translator, used when no translation model is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

/// True when `text` has an alphabetic character outside the Latin blocks.
pub fn contains_non_latin(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic() && !is_latin(c))
}

fn is_latin(c: char) -> bool {
    matches!(c as u32,
        0x0000..=0x024F     // ASCII, Latin-1, Extended-A/B
        | 0x0250..=0x02AF   // IPA
        | 0x1D00..=0x1DBF   // phonetic extensions
        | 0x1E00..=0x1EFF   // Latin Extended Additional
        | 0x2C60..=0x2C7F   // Extended-C
        | 0xA720..=0xA7FF   // Extended-D
        | 0xAB30..=0xAB6F   // Extended-E
        | 0xFB00..=0xFB06   // ligatures
        | 0xFF21..=0xFF3A
        | 0xFF41..=0xFF5A   // fullwidth
    )
}

/// Translates only when needed. Never fails: errors and blank output return `text`.
pub async fn translate_if_needed(translator: &dyn Translator, text: &str) -> String {
    if !contains_non_latin(text) {
        return text.to_string();
    }

    match translator.translate(text).await {
        Ok(translated) if !translated.trim().is_empty() => {
            debug!(
                original_len = text.len(),
                translated_len = translated.len(),
                "Query translated"
            );
            translated.trim().to_string()
        }
        Ok(_) => {
            warn!("Translation returned empty output, using original text");
            text.to_string()
        }
        Err(e) => {
            warn!(error = %e, "Translation failed, using original text");
            text.to_string()
        }
    }
}
