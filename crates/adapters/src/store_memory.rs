//! In-memory store for testing and offline mode

use async_trait::async_trait;
use news_digest_domain::{
    Article, ArticleStore, Digest, DigestStore, StoreError, User, UserDirectory,
};
use std::collections::HashMap;
use std::sync::RwLock;
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory implementation of the article/digest/user stores
#[derive(Default)]
pub struct InMemoryStore {
    articles: RwLock<Vec<Article>>,
    digests: RwLock<Vec<Digest>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user (the auth subsystem's job in production)
    pub fn put_user(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }

    fn matches(article: &Article, filter: Option<&str>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        let needle = filter.to_lowercase();
        article.category.to_lowercase().contains(&needle)
            || article.title.to_lowercase().contains(&needle)
            || article
                .summary
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        if articles.iter().any(|a| a.url == article.url) {
            return Err(StoreError::Conflict(format!(
                "duplicate article url: {}",
                article.url
            )));
        }
        articles.push(article.clone());
        Ok(())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, StoreError> {
        let articles = self
            .articles
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(articles.iter().find(|a| a.url == url).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let articles = self
            .articles
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }

    async fn update_summary(&self, id: Uuid, summary: Option<&str>) -> Result<(), StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let article = articles
            .iter_mut()
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
        let articles = self
            .articles
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let mut matched: Vec<Article> = articles
            .iter()
            .filter(|a| a.published_at >= start && a.published_at <= end)
            .cloned()
            .collect();
        matched.sort_by_key(|a| a.published_at);
        Ok(matched)
    }

    async fn count_articles(&self, filter: Option<&str>) -> Result<u64, StoreError> {
        let articles = self
            .articles
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(articles.iter().filter(|a| Self::matches(a, filter)).count() as u64)
    }

    async fn list_articles(
        &self,
        filter: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Article>, StoreError> {
        let articles = self
            .articles
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let mut matched: Vec<Article> = articles
            .iter()
            .filter(|a| Self::matches(a, filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[async_trait]
impl DigestStore for InMemoryStore {
    async fn insert_digest(&self, digest: &Digest) -> Result<(), StoreError> {
        self.digests
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?
            .push(digest.clone());
        Ok(())
    }

    async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<Digest>, StoreError> {
        let digests = self
            .digests
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(digests
            .iter()
            .filter(|d| d.user_id == user_id)
            .max_by_key(|d| d.date)
            .cloned())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(users.values().cloned().collect())
    }
}
