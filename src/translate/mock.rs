use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{TranslateError, Translator};

/// Returns a fixed translation (or fails) and counts calls.
pub struct MockTranslator {
    output: Option<String>,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn returning(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            output: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, _text: &str) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output.clone().ok_or(TranslateError::Provider {
            reason: "mock translator failure".to_string(),
        })
    }
}
