//! Paginated, filtered article queries

use std::sync::Arc;

use crate::{
    model::ArticlePage,
    ports::{ArticleStore, StoreError},
};

/// Default page size when `limit` is missing or out of range
pub const DEFAULT_LIMIT: u32 = 10;
/// Hard cap on page size
pub const MAX_LIMIT: u32 = 100;

/// A page request before clamping
///
/// Invalid values never error; they clamp to the documented defaults.
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size, valid range `[1, 100]`
    pub limit: Option<u32>,
    /// Case-insensitive substring matched against category, title and summary
    pub filter: Option<String>,
}

/// Query engine over the article store
pub struct QueryEngine<A>
where
    A: ArticleStore + ?Sized,
{
    store: Arc<A>,
}

impl<A> QueryEngine<A>
where
    A: ArticleStore + ?Sized,
{
    pub fn new(store: Arc<A>) -> Self {
        Self { store }
    }

    /// Run a page query ordered by `published_at` descending
    pub async fn query(&self, request: ArticleQuery) -> Result<ArticlePage, StoreError> {
        let page = match request.page {
            Some(p) if p >= 1 => p,
            _ => 1,
        };
        let limit = match request.limit {
            Some(l) if (1..=MAX_LIMIT).contains(&l) => l,
            _ => DEFAULT_LIMIT,
        };
        let filter = request
            .filter
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());

        let total_articles = self.store.count_articles(filter).await?;
        let total_pages = if total_articles == 0 {
            1
        } else {
            total_articles.div_ceil(limit as u64)
        };

        let offset = (page as u64 - 1) * limit as u64;
        let articles = self.store.list_articles(filter, offset, limit as u64).await?;

        Ok(ArticlePage {
            page,
            limit,
            total_articles,
            total_pages,
            articles,
        })
    }
}
