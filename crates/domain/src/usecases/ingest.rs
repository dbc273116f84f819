//! Ingestion pipeline - fetch, filter, dedup, categorize, summarize, persist

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use uuid::Uuid;

use crate::{
    model::{Article, FeedItem, IngestReport},
    policy::{Categorizer, filter_candidates},
    ports::{ArticleStore, Clock, FeedSource, StoreError},
    summarize::SummaryGateway,
};

/// Configuration for the ingestion pipeline
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Headlines requested per run
    pub page_size: u32,
    /// Maximum concurrent summarize+persist tasks
    pub max_concurrent: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_concurrent: 4,
        }
    }
}

/// Result of processing a single candidate
enum CandidateResult {
    Stored,
    Skipped,
    Failed,
}

/// Ingestion pipeline orchestrator
///
/// Idempotent at URL granularity: a candidate whose URL is already stored is
/// skipped, so re-running against an unchanged feed stores nothing new.
pub struct IngestPipeline<F, A, Cl>
where
    F: FeedSource + ?Sized,
    A: ArticleStore + ?Sized,
    Cl: Clock + ?Sized,
{
    feed: Arc<F>,
    store: Arc<A>,
    gateway: Arc<SummaryGateway>,
    categorizer: Arc<dyn Categorizer>,
    clock: Arc<Cl>,
    config: IngestConfig,
}

impl<F, A, Cl> IngestPipeline<F, A, Cl>
where
    F: FeedSource + ?Sized,
    A: ArticleStore + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        feed: Arc<F>,
        store: Arc<A>,
        gateway: Arc<SummaryGateway>,
        categorizer: Arc<dyn Categorizer>,
        clock: Arc<Cl>,
        config: IngestConfig,
    ) -> Self {
        Self {
            feed,
            store,
            gateway,
            categorizer,
            clock,
            config,
        }
    }

    /// Run one ingestion cycle
    ///
    /// Only the feed fetch itself can fail the run; everything downstream is
    /// isolated per candidate. An unconfigured feed yields `{0, 0}`.
    pub async fn run_once(&self) -> Result<IngestReport, IngestError> {
        let candidates = self
            .feed
            .fetch_top_headlines(self.config.page_size)
            .await
            .map_err(|e| IngestError::Feed(e.to_string()))?;

        let fetched_count = candidates.len();
        if fetched_count == 0 {
            tracing::info!("Feed returned no candidates");
            return Ok(IngestReport {
                fetched_count: 0,
                stored_count: 0,
            });
        }

        tracing::info!(count = fetched_count, "Fetched candidates");

        let accepted = filter_candidates(candidates);

        // Summarize+persist under a bounded pool; the dedup check runs inside
        // each task and the store's URL uniqueness backstop absorbs races.
        let mut stored_count = 0usize;
        let max_concurrent = self.config.max_concurrent.max(1);
        let mut tasks: FuturesUnordered<BoxFuture<'_, CandidateResult>> = FuturesUnordered::new();
        let mut items = accepted.into_iter();

        while tasks.len() < max_concurrent {
            let Some(item) = items.next() else {
                break;
            };
            tasks.push(Box::pin(self.process_candidate(item)));
        }

        while let Some(result) = tasks.next().await {
            if matches!(result, CandidateResult::Stored) {
                stored_count += 1;
            }
            while tasks.len() < max_concurrent {
                let Some(item) = items.next() else {
                    break;
                };
                tasks.push(Box::pin(self.process_candidate(item)));
            }
        }

        tracing::info!(
            fetched = fetched_count,
            stored = stored_count,
            "Ingestion cycle complete"
        );

        Ok(IngestReport {
            fetched_count,
            stored_count,
        })
    }

    async fn process_candidate(&self, item: FeedItem) -> CandidateResult {
        match self.store.find_by_url(&item.url).await {
            Ok(Some(_)) => {
                tracing::debug!(url = %item.url, "Already stored, skipping");
                return CandidateResult::Skipped;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(url = %item.url, error = %e, "Dedup check failed, skipping candidate");
                return CandidateResult::Failed;
            }
        }

        let category = self.categorizer.categorize(&item.title);

        // Best effort: every failure here, rate limiting included, leaves the
        // summary empty and the article is stored regardless.
        let input = if item.content.is_empty() {
            &item.title
        } else {
            &item.content
        };
        let summary = match self.gateway.summarize_article(input).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(url = %item.url, error = %e, "Error summarizing article");
                None
            }
        };

        let article = Article {
            id: Uuid::new_v4(),
            title: item.title,
            content: item.content,
            category,
            source: item.source,
            url: item.url,
            published_at: item.published_at,
            summary,
            created_at: self.clock.now(),
        };

        match self.store.insert_article(&article).await {
            Ok(()) => {
                tracing::debug!(url = %article.url, category = %article.category, "Stored article");
                CandidateResult::Stored
            }
            Err(StoreError::Conflict(_)) => {
                // Lost a dedup race; the backstop kept the invariant
                tracing::debug!(url = %article.url, "Duplicate URL, skipping");
                CandidateResult::Skipped
            }
            Err(e) => {
                tracing::error!(url = %article.url, error = %e, "Failed to store article");
                CandidateResult::Failed
            }
        }
    }
}

/// Errors from the ingestion pipeline
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Feed error: {0}")]
    Feed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::KeywordCategorizer;
    use crate::ports::{CompletionBackend, CompletionError, FeedError, SystemClock};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    struct FakeFeed {
        items: Vec<FeedItem>,
    }

    #[async_trait]
    impl FeedSource for FakeFeed {
        async fn fetch_top_headlines(&self, _page_size: u32) -> Result<Vec<FeedItem>, FeedError> {
            Ok(self.items.clone())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        articles: Mutex<HashMap<String, Article>>,
        fail_inserts: bool,
    }

    #[async_trait]
    impl ArticleStore for FakeStore {
        async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
            if self.fail_inserts {
                return Err(StoreError::Database("insert failed".to_string()));
            }
            let mut articles = self.articles.lock().unwrap();
            if articles.contains_key(&article.url) {
                return Err(StoreError::Conflict(article.url.clone()));
            }
            articles.insert(article.url.clone(), article.clone());
            Ok(())
        }

        async fn find_by_url(&self, url: &str) -> Result<Option<Article>, StoreError> {
            Ok(self.articles.lock().unwrap().get(url).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
            Ok(self
                .articles
                .lock()
                .unwrap()
                .values()
                .find(|a| a.id == id)
                .cloned())
        }

        async fn update_summary(
            &self,
            id: Uuid,
            summary: Option<&str>,
        ) -> Result<(), StoreError> {
            let mut articles = self.articles.lock().unwrap();
            let article = articles
                .values_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            article.summary = summary.map(String::from);
            Ok(())
        }

        async fn published_between(
            &self,
            start: OffsetDateTime,
            end: OffsetDateTime,
        ) -> Result<Vec<Article>, StoreError> {
            let mut matched: Vec<Article> = self
                .articles
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.published_at >= start && a.published_at <= end)
                .cloned()
                .collect();
            matched.sort_by_key(|a| a.published_at);
            Ok(matched)
        }

        async fn count_articles(&self, filter: Option<&str>) -> Result<u64, StoreError> {
            Ok(self.list_articles(filter, 0, u64::MAX).await?.len() as u64)
        }

        async fn list_articles(
            &self,
            filter: Option<&str>,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<Article>, StoreError> {
            let needle = filter.map(str::to_lowercase);
            let mut matched: Vec<Article> = self
                .articles
                .lock()
                .unwrap()
                .values()
                .filter(|a| match &needle {
                    None => true,
                    Some(n) => {
                        a.category.to_lowercase().contains(n)
                            || a.title.to_lowercase().contains(n)
                            || a.summary
                                .as_deref()
                                .is_some_and(|s| s.to_lowercase().contains(n))
                    }
                })
                .cloned()
                .collect();
            matched.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            Ok(matched
                .into_iter()
                .skip(offset as usize)
                .take(limit.min(usize::MAX as u64) as usize)
                .collect())
        }
    }

    struct CountingBackend {
        calls: std::sync::atomic::AtomicUsize,
        result: Result<String, ()>,
    }

    #[async_trait]
    impl CompletionBackend for CountingBackend {
        async fn complete(
            &self,
            _prompt: &str,
            _temperature: f64,
        ) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(CompletionError::Api("down".to_string())),
            }
        }

        fn is_configured(&self) -> bool {
            true
        }

        fn provider(&self) -> &'static str {
            "counting"
        }
    }

    fn item(title: &str, url: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            content: format!("{title} body"),
            source: "Wire".to_string(),
            url: url.to_string(),
            published_at: OffsetDateTime::now_utc(),
        }
    }

    fn pipeline(
        items: Vec<FeedItem>,
        store: Arc<FakeStore>,
        gateway: SummaryGateway,
    ) -> IngestPipeline<FakeFeed, FakeStore, SystemClock> {
        IngestPipeline::new(
            Arc::new(FakeFeed { items }),
            store,
            Arc::new(gateway),
            Arc::new(KeywordCategorizer::default()),
            Arc::new(SystemClock),
            IngestConfig::default(),
        )
    }

    #[tokio::test]
    async fn stores_new_articles_with_inferred_categories() {
        let store = Arc::new(FakeStore::default());
        let pipeline = pipeline(
            vec![
                item("New AI model released", "https://news.site/ai"),
                item("Local council meeting", "https://news.site/council"),
            ],
            store.clone(),
            SummaryGateway::disabled(),
        );

        let report = pipeline.run_once().await.unwrap();

        assert_eq!(report.fetched_count, 2);
        assert_eq!(report.stored_count, 2);
        let articles = store.articles.lock().unwrap();
        assert_eq!(articles["https://news.site/ai"].category, "AI");
        assert_eq!(articles["https://news.site/council"].category, "General");
    }

    #[tokio::test]
    async fn second_run_is_idempotent() {
        let store = Arc::new(FakeStore::default());
        let items = vec![
            item("Stock markets rally", "https://news.site/stocks"),
            item("COVID vaccine update", "https://news.site/covid"),
        ];

        let first = pipeline(items.clone(), store.clone(), SummaryGateway::disabled());
        let report = first.run_once().await.unwrap();
        assert_eq!(report.stored_count, 2);

        let second = pipeline(items, store.clone(), SummaryGateway::disabled());
        let report = second.run_once().await.unwrap();
        assert_eq!(report.fetched_count, 2);
        assert_eq!(report.stored_count, 0);
    }

    #[tokio::test]
    async fn discards_placeholder_and_malformed_urls() {
        let store = Arc::new(FakeStore::default());
        let pipeline = pipeline(
            vec![
                item("Good story", "https://news.site/good"),
                item("Placeholder", "https://example.com/demo"),
                item("No url", ""),
                item("Not http", "ftp://news.site/file"),
            ],
            store.clone(),
            SummaryGateway::disabled(),
        );

        let report = pipeline.run_once().await.unwrap();

        // fetched counts all candidates, stored only the survivor
        assert_eq!(report.fetched_count, 4);
        assert_eq!(report.stored_count, 1);
        assert!(store
            .articles
            .lock()
            .unwrap()
            .contains_key("https://news.site/good"));
    }

    #[tokio::test]
    async fn summarizer_failure_does_not_block_storage() {
        let store = Arc::new(FakeStore::default());
        let backend = Arc::new(CountingBackend {
            calls: std::sync::atomic::AtomicUsize::new(0),
            result: Err(()),
        });
        let pipeline = pipeline(
            vec![item("Good story", "https://news.site/good")],
            store.clone(),
            SummaryGateway::new(vec![backend]),
        );

        let report = pipeline.run_once().await.unwrap();

        assert_eq!(report.stored_count, 1);
        let articles = store.articles.lock().unwrap();
        assert!(articles["https://news.site/good"].summary.is_none());
    }

    #[tokio::test]
    async fn summaries_are_attached_when_provider_succeeds() {
        let store = Arc::new(FakeStore::default());
        let backend = Arc::new(CountingBackend {
            calls: std::sync::atomic::AtomicUsize::new(0),
            result: Ok("- a\n- b\n- c".to_string()),
        });
        let pipeline = pipeline(
            vec![item("Good story", "https://news.site/good")],
            store.clone(),
            SummaryGateway::new(vec![backend.clone()]),
        );

        pipeline.run_once().await.unwrap();

        assert_eq!(backend.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        let articles = store.articles.lock().unwrap();
        assert_eq!(
            articles["https://news.site/good"].summary.as_deref(),
            Some("- a\n- b\n- c")
        );
    }

    #[tokio::test]
    async fn store_failure_is_isolated_per_candidate() {
        let store = Arc::new(FakeStore {
            fail_inserts: true,
            ..Default::default()
        });
        let pipeline = pipeline(
            vec![
                item("One", "https://news.site/1"),
                item("Two", "https://news.site/2"),
            ],
            store.clone(),
            SummaryGateway::disabled(),
        );

        let report = pipeline.run_once().await.unwrap();

        assert_eq!(report.fetched_count, 2);
        assert_eq!(report.stored_count, 0);
    }
}
