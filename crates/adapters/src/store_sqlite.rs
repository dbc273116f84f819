//! SQLite store implementation
//!
//! Plays the role of the document store: articles, digest snapshots (JSON
//! column) and the read-only user directory. The UNIQUE constraint on
//! `articles.url` is the dedup backstop; violations surface as
//! `StoreError::Conflict`.

use async_trait::async_trait;
use news_digest_domain::{
    Article, ArticleStore, Digest, DigestStore, StoreError, User, UserDirectory,
};
use sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions, sqlite::SqliteRow};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

/// SQLite-backed store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) a store at the given path
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                source TEXT NOT NULL,
                url TEXT NOT NULL UNIQUE,
                published_at TEXT NOT NULL,
                summary TEXT,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_articles_published_at
            ON articles(published_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS digests (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                articles TEXT NOT NULL,
                summary_text TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_digests_user_date
            ON digests(user_id, date DESC)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                interests TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    /// Insert or update a user record
    ///
    /// Not part of a domain port: user mutation belongs to the auth
    /// subsystem. The helper exists for that subsystem, seeding and tests.
    pub async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        let interests = serde_json::to_string(&user.interests)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, interests)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                interests = excluded.interests
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&interests)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

fn fmt_ts(ts: OffsetDateTime) -> Result<String, StoreError> {
    // Normalize to UTC so stored strings compare chronologically
    ts.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

fn parse_ts(s: &str) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn parse_id(s: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(s).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn article_from_row(row: &SqliteRow) -> Result<Article, StoreError> {
    Ok(Article {
        id: parse_id(&row.get::<String, _>("id"))?,
        title: row.get("title"),
        content: row.get("content"),
        category: row.get("category"),
        source: row.get("source"),
        url: row.get("url"),
        published_at: parse_ts(&row.get::<String, _>("published_at"))?,
        summary: row.get("summary"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
    })
}

fn digest_from_row(row: &SqliteRow) -> Result<Digest, StoreError> {
    let articles: Vec<Article> = serde_json::from_str(&row.get::<String, _>("articles"))
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    Ok(Digest {
        id: parse_id(&row.get::<String, _>("id"))?,
        user_id: parse_id(&row.get::<String, _>("user_id"))?,
        date: parse_ts(&row.get::<String, _>("date"))?,
        articles,
        summary_text: row.get("summary_text"),
    })
}

const ARTICLE_COLUMNS: &str =
    "id, title, content, category, source, url, published_at, summary, created_at";

const FILTER_CLAUSE: &str = "(category LIKE '%' || ?1 || '%' \
     OR title LIKE '%' || ?1 || '%' \
     OR summary LIKE '%' || ?1 || '%')";

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (id, title, content, category, source, url, published_at, summary, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.category)
        .bind(&article.source)
        .bind(&article.url)
        .bind(fmt_ts(article.published_at)?)
        .bind(&article.summary)
        .bind(fmt_ts(article.created_at)?)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    Err(StoreError::Conflict(format!(
                        "duplicate article url: {}",
                        article.url
                    )))
                } else {
                    Err(StoreError::Database(e.to_string()))
                }
            }
        }
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = ?"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.as_ref().map(article_from_row).transpose()
    }

    async fn update_summary(&self, id: Uuid, summary: Option<&str>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE articles SET summary = ? WHERE id = ?")
            .bind(summary)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn published_between(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles \
             WHERE published_at >= ? AND published_at <= ? \
             ORDER BY published_at ASC"
        ))
        .bind(fmt_ts(start)?)
        .bind(fmt_ts(end)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.iter().map(article_from_row).collect()
    }

    async fn count_articles(&self, filter: Option<&str>) -> Result<u64, StoreError> {
        let count: (i64,) = match filter {
            Some(needle) => {
                sqlx::query_as(&format!(
                    "SELECT COUNT(*) FROM articles WHERE {FILTER_CLAUSE}"
                ))
                .bind(needle)
                .fetch_one(&self.pool)
                .await
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM articles")
                    .fetch_one(&self.pool)
                    .await
            }
        }
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(count.0 as u64)
    }

    async fn list_articles(
        &self,
        filter: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Article>, StoreError> {
        let rows = match filter {
            Some(needle) => {
                sqlx::query(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles WHERE {FILTER_CLAUSE} \
                     ORDER BY published_at DESC LIMIT ?2 OFFSET ?3"
                ))
                .bind(needle)
                .bind(limit as i64)
                .bind(offset as i64)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles \
                     ORDER BY published_at DESC LIMIT ? OFFSET ?"
                ))
                .bind(limit as i64)
                .bind(offset as i64)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.iter().map(article_from_row).collect()
    }
}

#[async_trait]
impl DigestStore for SqliteStore {
    async fn insert_digest(&self, digest: &Digest) -> Result<(), StoreError> {
        let articles = serde_json::to_string(&digest.articles)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO digests (id, user_id, date, articles, summary_text)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(digest.id.to_string())
        .bind(digest.user_id.to_string())
        .bind(fmt_ts(digest.date)?)
        .bind(&articles)
        .bind(&digest.summary_text)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn latest_for_user(&self, user_id: Uuid) -> Result<Option<Digest>, StoreError> {
        let row = sqlx::query(
            "SELECT id, user_id, date, articles, summary_text FROM digests \
             WHERE user_id = ? ORDER BY date DESC LIMIT 1",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.as_ref().map(digest_from_row).transpose()
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT id, name, email, interests FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let interests: Vec<String> =
                    serde_json::from_str(&row.get::<String, _>("interests"))
                        .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(User {
                    id: parse_id(&row.get::<String, _>("id"))?,
                    name: row.get("name"),
                    email: row.get("email"),
                    interests,
                })
            })
            .collect()
    }
}
