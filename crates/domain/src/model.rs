//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored news article with inferred category and optional AI summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique record ID
    pub id: Uuid,
    /// Headline
    pub title: String,
    /// Body text as provided by the upstream feed
    pub content: String,
    /// Inferred category (e.g. "AI", "Finance", "General")
    pub category: String,
    /// Name of the publishing source
    pub source: String,
    /// Canonical article URL; globally unique natural key
    pub url: String,
    /// When the article was published upstream
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    /// AI-generated summary, absent when no provider was available
    pub summary: Option<String>,
    /// When the article was stored
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A normalized candidate record from the external feed
///
/// Every field is defaulted during normalization; a candidate never carries
/// missing/null fields into the pipeline. Candidates with unusable URLs are
/// discarded by the ingestion pipeline, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Headline ("(untitled)" when the feed omitted one)
    pub title: String,
    /// Body or description text, possibly empty
    pub content: String,
    /// Source name ("Unknown" when the feed omitted one)
    pub source: String,
    /// Article URL, possibly empty when the feed record was malformed
    pub url: String,
    /// Upstream publication time (fetch time when absent or unparsable)
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

/// A registered user, read-only to the pipeline
///
/// Credentials and profile mutation belong to the auth subsystem; the digest
/// assembler only consumes `email`, `name` and `interests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Categories the user wants digests for; exact-match against
    /// `Article::category`
    #[serde(default)]
    pub interests: Vec<String>,
}

/// A per-user, per-day digest snapshot
///
/// The article list is a point-in-time copy; later mutation of the stored
/// articles (e.g. re-summarization) does not affect an existing digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub id: Uuid,
    pub user_id: Uuid,
    /// When the digest was assembled
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Matched articles in window order
    pub articles: Vec<Article>,
    /// AI overview of the matched articles, absent when summarization was
    /// unavailable or failed
    pub summary_text: Option<String>,
}

/// Counters returned by one ingestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Candidates received from the feed, before filtering and dedup
    pub fetched_count: usize,
    /// Articles newly stored by this run
    pub stored_count: usize,
}

/// One page of query results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePage {
    /// Effective page after clamping (1-based)
    pub page: u32,
    /// Effective page size after clamping
    pub limit: u32,
    /// Total articles matching the filter
    pub total_articles: u64,
    /// `ceil(total_articles / limit)`, at least 1
    pub total_pages: u64,
    pub articles: Vec<Article>,
}

/// Per-user result of one digest run
#[derive(Debug)]
pub enum DigestOutcome {
    /// Digest persisted; `emailed` is false when dispatch failed or the
    /// mailer is unconfigured
    Delivered { digest_id: Uuid, emailed: bool },
    /// User skipped (no interests, no matching articles)
    Skipped { reason: String },
    /// Digest could not be persisted for this user
    Failed { error: String },
}
