//! news-digest adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `feed`: NewsAPI-style headlines source
//! - `llm`: AI completion backends (OpenAI, Gemini, stub)
//! - `mail`: SendGrid mail dispatch
//! - `store`: SQLite and in-memory stores

mod feed_newsapi;
mod mail_sendgrid;
mod store_memory;
mod store_sqlite;

pub mod llm;

/// Re-exports for feed adapters
pub mod feed {
    pub use crate::feed_newsapi::{NewsApiSource, StubFeedSource};
}

/// Re-exports for mail adapters
pub mod mail {
    pub use crate::mail_sendgrid::SendGridMailer;
}

/// Re-exports for store adapters
pub mod store {
    pub use crate::store_memory::InMemoryStore;
    pub use crate::store_sqlite::SqliteStore;
}
