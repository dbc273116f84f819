//! Manual article re-summarization

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    model::Article,
    ports::{ArticleStore, CompletionError, StoreError},
    summarize::SummaryGateway,
};

/// Errors surfaced to the interactive caller
///
/// Unlike the background pipeline, rate limiting is NOT absorbed here: the
/// caller gets the distinguished kind so it can react (retry later, billing).
#[derive(Debug, thiserror::Error)]
pub enum ResummarizeError {
    #[error("Article not found: {0}")]
    NotFound(Uuid),
    #[error("AI provider quota exceeded")]
    RateLimited,
    #[error("Summarization failed: {0}")]
    Summarize(String),
    #[error("Store error: {0}")]
    Store(String),
}

/// Manual re-summarization entry point
pub struct Resummarizer<A>
where
    A: ArticleStore + ?Sized,
{
    store: Arc<A>,
    gateway: Arc<SummaryGateway>,
}

impl<A> Resummarizer<A>
where
    A: ArticleStore + ?Sized,
{
    pub fn new(store: Arc<A>, gateway: Arc<SummaryGateway>) -> Self {
        Self { store, gateway }
    }

    /// Re-summarize one article and persist the result
    ///
    /// On any summarization error the stored summary is left unchanged. With
    /// no provider configured the summary is cleared, matching a successful
    /// "nothing to say" run.
    pub async fn resummarize(&self, id: Uuid) -> Result<Article, ResummarizeError> {
        let mut article = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| ResummarizeError::Store(e.to_string()))?
            .ok_or(ResummarizeError::NotFound(id))?;

        let input = if article.content.is_empty() {
            &article.title
        } else {
            &article.content
        };

        let summary = match self.gateway.summarize_article(input).await {
            Ok(summary) => summary,
            Err(CompletionError::RateLimited) => return Err(ResummarizeError::RateLimited),
            Err(e) => return Err(ResummarizeError::Summarize(e.to_string())),
        };

        self.store
            .update_summary(id, summary.as_deref())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ResummarizeError::NotFound(id),
                other => ResummarizeError::Store(other.to_string()),
            })?;

        article.summary = summary;
        Ok(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{CompletionBackend, CompletionError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use time::OffsetDateTime;

    #[derive(Default)]
    struct FakeStore {
        articles: Mutex<HashMap<Uuid, Article>>,
    }

    #[async_trait]
    impl ArticleStore for FakeStore {
        async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
            self.articles
                .lock()
                .unwrap()
                .insert(article.id, article.clone());
            Ok(())
        }

        async fn find_by_url(&self, _url: &str) -> Result<Option<Article>, StoreError> {
            unimplemented!("not used by resummarize tests")
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
            Ok(self.articles.lock().unwrap().get(&id).cloned())
        }

        async fn update_summary(
            &self,
            id: Uuid,
            summary: Option<&str>,
        ) -> Result<(), StoreError> {
            let mut articles = self.articles.lock().unwrap();
            let article = articles
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            article.summary = summary.map(String::from);
            Ok(())
        }

        async fn published_between(
            &self,
            _start: OffsetDateTime,
            _end: OffsetDateTime,
        ) -> Result<Vec<Article>, StoreError> {
            unimplemented!("not used by resummarize tests")
        }

        async fn count_articles(&self, _filter: Option<&str>) -> Result<u64, StoreError> {
            unimplemented!("not used by resummarize tests")
        }

        async fn list_articles(
            &self,
            _filter: Option<&str>,
            _offset: u64,
            _limit: u64,
        ) -> Result<Vec<Article>, StoreError> {
            unimplemented!("not used by resummarize tests")
        }
    }

    struct FixedBackend {
        result: Result<String, CompletionError>,
    }

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(
            &self,
            _prompt: &str,
            _temperature: f64,
        ) -> Result<String, CompletionError> {
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(CompletionError::RateLimited) => Err(CompletionError::RateLimited),
                Err(_) => Err(CompletionError::Api("down".to_string())),
            }
        }

        fn is_configured(&self) -> bool {
            true
        }

        fn provider(&self) -> &'static str {
            "fixed"
        }
    }

    fn seeded_store(summary: Option<&str>) -> (Arc<FakeStore>, Uuid) {
        let store = Arc::new(FakeStore::default());
        let id = Uuid::new_v4();
        store.articles.lock().unwrap().insert(
            id,
            Article {
                id,
                title: "Title".to_string(),
                content: "Body".to_string(),
                category: "General".to_string(),
                source: "Wire".to_string(),
                url: "https://news.site/1".to_string(),
                published_at: OffsetDateTime::now_utc(),
                summary: summary.map(String::from),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        (store, id)
    }

    #[tokio::test]
    async fn updates_summary_and_returns_article() {
        let (store, id) = seeded_store(Some("old"));
        let gateway = SummaryGateway::new(vec![Arc::new(FixedBackend {
            result: Ok("new summary".to_string()),
        })]);
        let resummarizer = Resummarizer::new(store.clone(), Arc::new(gateway));

        let article = resummarizer.resummarize(id).await.unwrap();

        assert_eq!(article.summary.as_deref(), Some("new summary"));
        let stored = store.articles.lock().unwrap();
        assert_eq!(stored[&id].summary.as_deref(), Some("new summary"));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = Arc::new(FakeStore::default());
        let resummarizer =
            Resummarizer::new(store, Arc::new(SummaryGateway::disabled()));

        let result = resummarizer.resummarize(Uuid::new_v4()).await;

        assert!(matches!(result, Err(ResummarizeError::NotFound(_))));
    }

    #[tokio::test]
    async fn rate_limit_surfaces_distinctly_and_keeps_old_summary() {
        let (store, id) = seeded_store(Some("old"));
        let gateway = SummaryGateway::new(vec![Arc::new(FixedBackend {
            result: Err(CompletionError::RateLimited),
        })]);
        let resummarizer = Resummarizer::new(store.clone(), Arc::new(gateway));

        let result = resummarizer.resummarize(id).await;

        assert!(matches!(result, Err(ResummarizeError::RateLimited)));
        let stored = store.articles.lock().unwrap();
        assert_eq!(stored[&id].summary.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn generic_failure_is_not_rate_limited() {
        let (store, id) = seeded_store(None);
        let gateway = SummaryGateway::new(vec![Arc::new(FixedBackend {
            result: Err(CompletionError::Api("down".to_string())),
        })]);
        let resummarizer = Resummarizer::new(store, Arc::new(gateway));

        let result = resummarizer.resummarize(id).await;

        assert!(matches!(result, Err(ResummarizeError::Summarize(_))));
    }
}
