//! Seed-demo command - sample user and articles for local runs

use anyhow::{Context, Result};
use news_digest_domain::{Article, ArticleStore, StoreError, User};
use std::path::PathBuf;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::args::SeedDemoArgs;
use crate::config::AppConfig;

pub async fn execute(_args: SeedDemoArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = super::open_store(&config).await?;

    let user = User {
        id: Uuid::new_v4(),
        name: "Ritik".to_string(),
        email: "ritik@demo.news-digest.app".to_string(),
        interests: vec!["AI".to_string(), "Web Development".to_string()],
    };
    store.upsert_user(&user).await.context("Failed to seed user")?;

    let now = OffsetDateTime::now_utc();
    let samples = [
        (
            "New AI model launched with improved reasoning",
            "A new AI model has been released featuring improved reasoning and efficiency. \
             Experts expect broad adoption across industries.",
            "AI",
            "https://demo.news-digest.app/ai-model",
            Some("- Improved reasoning\n- Better efficiency\n- Expected wide adoption"),
        ),
        (
            "React update released with performance improvements",
            "The React team released an update focused on performance and developer \
             experience, including new tooling improvements.",
            "Web Development",
            "https://demo.news-digest.app/react-update",
            Some("- Performance improvements\n- Better DX\n- Tooling updates included"),
        ),
        (
            "Finance markets rally amid economic optimism",
            "Stocks rallied today as investors reacted to optimistic economic indicators \
             and positive earnings reports.",
            "Finance",
            "https://demo.news-digest.app/finance-rally",
            Some("- Markets rallied\n- Optimistic indicators\n- Strong earnings"),
        ),
        (
            "Health officials publish new vaccine guidance",
            "Updated vaccine guidance was published today covering seasonal boosters \
             and availability.",
            "Health",
            "https://demo.news-digest.app/vaccine-guidance",
            None,
        ),
    ];

    let mut stored = 0usize;
    for (title, content, category, url, summary) in samples {
        let article = Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            source: "DemoSource".to_string(),
            url: url.to_string(),
            published_at: now,
            summary: summary.map(String::from),
            created_at: now,
        };

        match store.insert_article(&article).await {
            Ok(()) => stored += 1,
            // Re-seeding an existing store is fine
            Err(StoreError::Conflict(_)) => {}
            Err(e) => return Err(e).context("Failed to seed article"),
        }
    }

    println!(
        "Seeded demo user {} ({}) and {} articles",
        user.name, user.id, stored
    );

    Ok(())
}
