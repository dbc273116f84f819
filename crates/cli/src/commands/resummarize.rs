//! Resummarize command - manual re-summarization of one article

use anyhow::{Context, Result, bail};
use news_digest_domain::usecases::{Resummarizer, ResummarizeError};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::args::ResummarizeArgs;
use crate::config::AppConfig;

pub async fn execute(args: ResummarizeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let article_id = Uuid::parse_str(&args.article_id).context("Invalid article ID")?;

    let store = super::open_store(&config).await?;
    let resummarizer = Resummarizer::new(store, Arc::new(super::build_gateway(&config)?));

    // Interactive path: the error kind is surfaced, not absorbed
    let article = match resummarizer.resummarize(article_id).await {
        Ok(article) => article,
        Err(ResummarizeError::NotFound(id)) => bail!("Article not found: {id}"),
        Err(ResummarizeError::RateLimited) => {
            bail!("AI provider quota exceeded - try again later or add billing")
        }
        Err(e) => return Err(e).context("Re-summarization failed"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&article)?);
    } else {
        println!("{}", article.title);
        match &article.summary {
            Some(summary) => println!("\n{summary}"),
            None => println!("\n(no summary available)"),
        }
    }

    Ok(())
}
