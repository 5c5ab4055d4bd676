// Translator trait and the pass-through wrapper the pipeline uses.

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Trait for translating text into English.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Translate `text`, falling back to the original on any failure.
///
/// Translation is best effort: an untranslated abstract still carries
/// entities the recognizer may pick up, so a failure is never fatal.
pub async fn translate_or_passthrough(translator: &dyn Translator, text: &str) -> String {
    match translator.translate(text).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!(
                error = %e,
                text_preview = %crate::output::truncate_chars(text, 50),
                "Translation failed, keeping original text"
            );
            text.to_string()
        }
    }
}
