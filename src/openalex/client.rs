// OpenAlex HTTP client: unauthenticated JSON over HTTP.
//
// A thin reqwest wrapper around the `/works` endpoint. Client identity
// (contact email for the polite pool, user agent) and the retry policy are
// fixed at construction and read by every request; nothing about them can
// change mid-session.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::paginate::PageSource;
use super::query::WorksQuery;
use super::retry::{with_retry, RateLimiter, RetryPolicy};
use crate::error::{Error, Result};

/// Default OpenAlex API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openalex.org";

/// Largest page OpenAlex serves.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Session-wide client identity and retry knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Sent as `mailto` to join the polite pool
    pub contact_email: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            contact_email: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// HTTP client for the OpenAlex works API.
pub struct OpenAlexClient {
    client: reqwest::Client,
    config: ClientConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl OpenAlexClient {
    /// Create a client with the polite-pool rate limit.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_rate_limiter(config, Arc::new(RateLimiter::polite_pool()))
    }

    /// Create a client sharing an existing rate limiter.
    pub fn with_rate_limiter(config: ClientConfig, rate_limiter: Arc<RateLimiter>) -> Result<Self> {
        let user_agent = match config.contact_email {
            Some(ref email) => format!("biblioscope/0.1 (mailto:{email})"),
            None => "biblioscope/0.1".to_string(),
        };

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            config: ClientConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            rate_limiter,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `/works` with the given parameters, retrying transient failures.
    pub async fn get_works(&self, params: &[(String, String)]) -> Result<WorksPage> {
        with_retry(&self.rate_limiter, &self.config.retry, || self.get_once(params)).await
    }

    async fn get_once(&self, params: &[(String, String)]) -> Result<WorksPage> {
        let url = format!("{}/works", self.config.base_url);

        let mut request = self.client.get(&url).query(params);
        if let Some(ref email) = self.config.contact_email {
            request = request.query(&[("mailto", email)]);
        }

        debug!(url = %url, "OpenAlex GET request");

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamStatus { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl PageSource for OpenAlexClient {
    async fn fetch_page(&self, query: &WorksQuery, cursor: &str, per_page: u32) -> Result<WorksPage> {
        self.get_works(&query.page_params(cursor, per_page)).await
    }
}

// -- Serde types for the /works response --

/// One page of a `/works` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WorksPage {
    pub meta: PageMeta,
    /// Raw work records (empty for grouped queries)
    #[serde(default)]
    pub results: Vec<Value>,
    /// Aggregated rows (present only for grouped queries)
    #[serde(default)]
    pub group_by: Vec<GroupedCount>,
}

/// Paging metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Total matching items (works or groups)
    pub count: Option<u64>,
    pub next_cursor: Option<String>,
}

/// One server-side aggregation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedCount {
    #[serde(deserialize_with = "key_as_string")]
    pub key: String,
    #[serde(default)]
    pub key_display_name: Option<String>,
    pub count: u64,
}

impl GroupedCount {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            key_display_name: None,
            count,
        }
    }
}

/// Group keys arrive as strings for most attributes but as numbers for a few.
fn key_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_grouped_page() {
        let json = r#"{
            "meta": {"count": 2, "next_cursor": null},
            "results": [],
            "group_by": [
                {"key": "2020", "key_display_name": "2020", "count": 100},
                {"key": 2021, "count": 50}
            ]
        }"#;
        let page: WorksPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.group_by.len(), 2);
        assert_eq!(page.group_by[0].key, "2020");
        assert_eq!(page.group_by[1].key, "2021");
        assert_eq!(page.group_by[1].count, 50);
        assert!(page.meta.next_cursor.is_none());
    }

    #[test]
    fn test_deserialize_page_without_group_by() {
        let json = r#"{"meta": {"count": 1, "next_cursor": "abc"}, "results": [{"id": "W1"}]}"#;
        let page: WorksPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(page.group_by.is_empty());
        assert_eq!(page.meta.next_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenAlexClient::new(ClientConfig {
            base_url: "http://localhost:9999/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.config().base_url, "http://localhost:9999");
    }
}
