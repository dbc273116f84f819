//! Summarization gateway
//!
//! Unifies the configured AI providers behind one call with ordered
//! fallback. Summarization is best-effort: with no provider configured the
//! gateway yields `Ok(None)` and the pipeline stores articles unsummarized.

use std::sync::Arc;

use crate::model::Article;
use crate::ports::{CompletionBackend, CompletionError};

const ARTICLE_TEMPERATURE: f64 = 0.3;
const DIGEST_TEMPERATURE: f64 = 0.4;

/// Gateway over an ordered list of completion backends
///
/// Fallback rules: an unconfigured backend is skipped; `RateLimited`
/// propagates immediately so interactive callers can surface a quota
/// message; any other failure logs and falls through to the next backend.
/// The last backend's failure propagates to the caller.
pub struct SummaryGateway {
    backends: Vec<Arc<dyn CompletionBackend>>,
}

impl SummaryGateway {
    pub fn new(backends: Vec<Arc<dyn CompletionBackend>>) -> Self {
        Self { backends }
    }

    /// Gateway with no providers; always yields `Ok(None)`
    pub fn disabled() -> Self {
        Self { backends: vec![] }
    }

    /// Summarize a single article body (or title when the body is empty)
    pub async fn summarize_article(
        &self,
        content: &str,
    ) -> Result<Option<String>, CompletionError> {
        self.complete_with_fallback(&build_article_prompt(content), ARTICLE_TEMPERATURE)
            .await
    }

    /// Summarize a digest's matched articles, in their matched order
    pub async fn summarize_digest(
        &self,
        articles: &[Article],
    ) -> Result<Option<String>, CompletionError> {
        self.complete_with_fallback(&build_digest_prompt(articles), DIGEST_TEMPERATURE)
            .await
    }

    async fn complete_with_fallback(
        &self,
        prompt: &str,
        temperature: f64,
    ) -> Result<Option<String>, CompletionError> {
        let mut last_error: Option<CompletionError> = None;

        for backend in &self.backends {
            if !backend.is_configured() {
                tracing::debug!(provider = backend.provider(), "Skipping unconfigured provider");
                continue;
            }

            match backend.complete(prompt, temperature).await {
                Ok(text) => return Ok(Some(text.trim().to_string())),
                Err(CompletionError::Unconfigured) => {
                    tracing::debug!(provider = backend.provider(), "Provider has no client");
                    continue;
                }
                Err(CompletionError::RateLimited) => {
                    tracing::warn!(provider = backend.provider(), "Provider rate limited");
                    return Err(CompletionError::RateLimited);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = backend.provider(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => {
                tracing::warn!("No summarization provider configured, skipping summarization");
                Ok(None)
            }
        }
    }
}

/// Prompt for single-article summarization
pub fn build_article_prompt(content: &str) -> String {
    format!("Summarize this news in 3 clear bullet points.\n\n{content}")
}

/// Prompt for digest summarization over the matched articles
pub fn build_digest_prompt(articles: &[Article]) -> String {
    let combined = articles
        .iter()
        .enumerate()
        .map(|(idx, a)| {
            let body = a.summary.as_deref().unwrap_or(&a.content);
            format!("{}. {}\n{}", idx + 1, a.title, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are creating a daily personalized news digest.\n\
         Summarize the following news items in a concise friendly paragraph \
         followed by 3-5 bullet points highlighting key themes.\n\n{combined}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct FakeBackend {
        name: &'static str,
        configured: bool,
        result: Result<String, CompletionError>,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn ok(name: &'static str, text: &str) -> Self {
            Self {
                name,
                configured: true,
                result: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn err(name: &'static str, error: CompletionError) -> Self {
            Self {
                name,
                configured: true,
                result: Err(error),
                calls: AtomicUsize::new(0),
            }
        }

        fn unconfigured(name: &'static str) -> Self {
            Self {
                name,
                configured: false,
                result: Err(CompletionError::Unconfigured),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for FakeBackend {
        async fn complete(
            &self,
            _prompt: &str,
            _temperature: f64,
        ) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(CompletionError::Unconfigured) => Err(CompletionError::Unconfigured),
                Err(CompletionError::RateLimited) => Err(CompletionError::RateLimited),
                Err(CompletionError::Timeout) => Err(CompletionError::Timeout),
                Err(CompletionError::Api(m)) => Err(CompletionError::Api(m.clone())),
                Err(CompletionError::InvalidFormat(m)) => {
                    Err(CompletionError::InvalidFormat(m.clone()))
                }
            }
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn provider(&self) -> &'static str {
            self.name
        }
    }

    fn article(title: &str, summary: Option<&str>, content: &str) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            category: "General".to_string(),
            source: "Wire".to_string(),
            url: format!("https://news.site/{title}"),
            published_at: OffsetDateTime::now_utc(),
            summary: summary.map(String::from),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn uses_first_configured_backend() {
        let primary = Arc::new(FakeBackend::ok("primary", "from primary"));
        let secondary = Arc::new(FakeBackend::ok("secondary", "from secondary"));
        let gateway =
            SummaryGateway::new(vec![primary.clone(), secondary.clone()]);

        let result = gateway.summarize_article("body").await.unwrap();

        assert_eq!(result.as_deref(), Some("from primary"));
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_through_unconfigured_and_transient_failures() {
        let unconfigured = Arc::new(FakeBackend::unconfigured("primary"));
        let broken = Arc::new(FakeBackend::err(
            "middle",
            CompletionError::Api("boom".to_string()),
        ));
        let working = Arc::new(FakeBackend::ok("fallback", "  text  "));
        let gateway = SummaryGateway::new(vec![unconfigured, broken, working]);

        let result = gateway.summarize_article("body").await.unwrap();

        // Output is trimmed
        assert_eq!(result.as_deref(), Some("text"));
    }

    #[tokio::test]
    async fn rate_limit_propagates_without_fallback() {
        let limited = Arc::new(FakeBackend::err("primary", CompletionError::RateLimited));
        let fallback = Arc::new(FakeBackend::ok("fallback", "never used"));
        let gateway = SummaryGateway::new(vec![limited, fallback.clone()]);

        let result = gateway.summarize_article("body").await;

        assert!(matches!(result, Err(CompletionError::RateLimited)));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_configured_provider_yields_none() {
        let gateway = SummaryGateway::new(vec![Arc::new(FakeBackend::unconfigured("primary"))]);
        let result = gateway.summarize_article("body").await.unwrap();
        assert!(result.is_none());

        let empty = SummaryGateway::disabled();
        assert!(empty.summarize_article("body").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_backend_error_propagates() {
        let broken = Arc::new(FakeBackend::err(
            "only",
            CompletionError::Timeout,
        ));
        let gateway = SummaryGateway::new(vec![broken]);

        let result = gateway.summarize_article("body").await;
        assert!(matches!(result, Err(CompletionError::Timeout)));
    }

    #[test]
    fn digest_prompt_numbers_items_and_prefers_summaries() {
        let articles = vec![
            article("First", Some("S1"), "C1"),
            article("Second", None, "C2"),
        ];

        let prompt = build_digest_prompt(&articles);

        assert!(prompt.contains("1. First\nS1"));
        assert!(prompt.contains("2. Second\nC2"));
        assert!(prompt.contains("3-5 bullet points"));
    }
}
