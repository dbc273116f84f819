//! Query command - paginated article listing

use anyhow::{Context, Result};
use news_digest_domain::usecases::{ArticleQuery, QueryEngine};
use std::path::PathBuf;

use crate::args::QueryArgs;
use crate::config::AppConfig;

pub async fn execute(args: QueryArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = super::open_store(&config).await?;
    let engine = QueryEngine::new(store);

    // Non-numeric page/limit values clamp to defaults instead of erroring
    let request = ArticleQuery {
        page: args.page.as_deref().and_then(|p| p.parse().ok()),
        limit: args.limit.as_deref().and_then(|l| l.parse().ok()),
        filter: args.filter,
    };

    let page = engine.query(request).await.context("Query failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        println!(
            "Page {}/{} ({} articles, {} per page)",
            page.page, page.total_pages, page.total_articles, page.limit
        );
        for article in &page.articles {
            let summary_marker = if article.summary.is_some() { "*" } else { " " };
            println!(
                "{summary_marker} [{}] {}  ({}, {})",
                article.category, article.title, article.source, article.published_at
            );
        }
    }

    Ok(())
}
