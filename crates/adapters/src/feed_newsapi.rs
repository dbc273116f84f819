//! NewsAPI-style feed adapter for fetching top headlines

use async_trait::async_trait;
use news_digest_domain::{FeedError, FeedItem, FeedSource};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const DEFAULT_TITLE: &str = "(untitled)";
const DEFAULT_SOURCE: &str = "Unknown";

/// Feed source backed by a NewsAPI-compatible top-headlines endpoint
///
/// A source without a credential is a soft no-op: fetches resolve to an
/// empty list so scheduled ingestion degrades to `{0, 0}` instead of erroring.
pub struct NewsApiSource {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    language: String,
}

impl NewsApiSource {
    pub fn new(api_key: Option<SecretString>, language: String) -> Self {
        Self::with_base_url(api_key, "https://newsapi.org".to_string(), language)
    }

    pub fn with_base_url(
        api_key: Option<SecretString>,
        base_url: String,
        language: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            language,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// Raw upstream record; every field may be missing or null
#[derive(Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

impl RawArticle {
    /// Map a raw record to the normalized candidate shape; every missing
    /// field takes its defined default so no null-safety leaks downstream
    fn normalize(self, fetched_at: OffsetDateTime) -> FeedItem {
        let published_at = self
            .published_at
            .as_deref()
            .and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
            .unwrap_or(fetched_at);

        FeedItem {
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            content: self.content.or(self.description).unwrap_or_default(),
            source: self
                .source
                .and_then(|s| s.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            url: self.url.unwrap_or_default(),
            published_at,
        }
    }
}

#[async_trait]
impl FeedSource for NewsApiSource {
    async fn fetch_top_headlines(&self, page_size: u32) -> Result<Vec<FeedItem>, FeedError> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("News feed API key not set, skipping external fetch");
            return Ok(vec![]);
        };

        let url = format!(
            "{}/v2/top-headlines?language={}&pageSize={}",
            self.base_url, self.language, page_size
        );

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", api_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::Network("timeout".to_string())
                } else {
                    FeedError::Network(e.to_string())
                }
            })?;

        if response.status() == 401 {
            return Err(FeedError::Auth("Invalid feed API key".to_string()));
        }

        if response.status() == 429 {
            return Err(FeedError::RateLimited(None));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api(format!("API returned {status}: {body}")));
        }

        let headlines: HeadlinesResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Api(e.to_string()))?;

        let fetched_at = OffsetDateTime::now_utc();
        Ok(headlines
            .articles
            .into_iter()
            .map(|raw| raw.normalize(fetched_at))
            .collect())
    }
}

/// Stub feed source for tests and offline runs
#[derive(Default)]
pub struct StubFeedSource {
    items: Vec<FeedItem>,
}

impl StubFeedSource {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl FeedSource for StubFeedSource {
    async fn fetch_top_headlines(&self, page_size: u32) -> Result<Vec<FeedItem>, FeedError> {
        Ok(self
            .items
            .iter()
            .take(page_size as usize)
            .cloned()
            .collect())
    }
}
