// Google Translate over the public `translate_a/single` endpoint.
//
// No API key. Source language is auto-detected and the target is English.
// The response is a nested JSON array; the first element holds one entry per
// sentence chunk, each starting with the translated text.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::Translator;
use crate::error::{Error, Result};

pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com";

/// The endpoint rejects longer inputs.
pub const MAX_CHARS: usize = 5000;

pub struct GoogleTranslator {
    client: Client,
    base_url: String,
    target: String,
    rate_limiter: RateLimiter,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_TRANSLATE_URL)
    }

    /// Point at a different host (used by tests).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            target: "en".to_string(),
            // Roughly what the endpoint tolerates without 429s
            rate_limiter: RateLimiter::new(5.0),
        }
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let chars = text.chars().count();
        if chars > MAX_CHARS {
            return Err(Error::Translation(format!(
                "text is {chars} characters, limit is {MAX_CHARS}"
            )));
        }

        self.rate_limiter.acquire().await;

        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Translation(format!("endpoint returned {status}: {body}")));
        }

        let body: Value = response.json().await?;
        let translated = parse_translation(&body)
            .ok_or_else(|| Error::Translation("unexpected response shape".to_string()))?;

        debug!(chars, "Translated text");
        Ok(translated)
    }
}

/// Concatenate the translated chunks of a `translate_a/single` response.
pub fn parse_translation(body: &Value) -> Option<String> {
    let chunks = body.get(0)?.as_array()?;
    let text: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
