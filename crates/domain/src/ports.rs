//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{Article, Digest, FeedItem, User};

/// Error type for feed source operations
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited, retry after: {0:?}")]
    RateLimited(Option<std::time::Duration>),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Port for fetching headlines from the external news feed
///
/// An unconfigured source (missing credential) must resolve to an empty
/// list, not an error; ingestion treats that run as a soft no-op.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch up to `page_size` current top headlines, normalized
    async fn fetch_top_headlines(&self, page_size: u32) -> Result<Vec<FeedItem>, FeedError>;
}

/// Error type for AI completion backends
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No credential configured for this backend; the gateway falls through
    #[error("Provider not configured")]
    Unconfigured,
    /// Provider quota exhausted (HTTP 429); never silently swallowed
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// Port for a single AI text-completion provider
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete a prompt, returning the raw text
    async fn complete(&self, prompt: &str, temperature: f64) -> Result<String, CompletionError>;

    /// Whether a credential is present for this backend
    fn is_configured(&self) -> bool;

    /// Provider name for logs (e.g. "openai", "gemini")
    fn provider(&self) -> &'static str;
}

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// Uniqueness backstop violation (duplicate article URL)
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for article persistence and queries
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article; `StoreError::Conflict` when the URL exists
    async fn insert_article(&self, article: &Article) -> Result<(), StoreError>;

    /// Look up an article by its unique URL
    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, StoreError>;

    /// Look up an article by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError>;

    /// Replace the stored summary for an article
    async fn update_summary(&self, id: Uuid, summary: Option<&str>) -> Result<(), StoreError>;

    /// Articles with `published_at` in `[start, end]`, oldest first
    async fn published_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Article>, StoreError>;

    /// Count articles matching an optional case-insensitive substring filter
    /// over category, title and summary
    async fn count_articles(&self, filter: Option<&str>) -> Result<u64, StoreError>;

    /// List filtered articles ordered by `published_at` descending
    async fn list_articles(
        &self,
        filter: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Article>, StoreError>;
}

/// Port for digest persistence
#[async_trait]
pub trait DigestStore: Send + Sync {
    /// Insert a new digest snapshot
    async fn insert_digest(&self, digest: &Digest) -> Result<(), StoreError>;

    /// Most recent digest for a user, if any
    async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<Digest>, StoreError>;
}

/// Read-only port onto the user directory owned by the auth subsystem
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

/// Error type for mail dispatch
#[derive(Debug, Error)]
pub enum MailError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// An outbound email; the adapter supplies the sender address
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Port for outbound email dispatch
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a message; a disabled mailer must be a logged no-op
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;

    /// Whether a credential is present
    fn is_enabled(&self) -> bool;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
