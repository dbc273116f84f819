//! Ingest command - manual fetch trigger

use anyhow::{Context, Result};
use news_digest_domain::policy::KeywordCategorizer;
use news_digest_domain::usecases::{IngestConfig, IngestPipeline};
use news_digest_domain::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::IngestArgs;
use crate::config::AppConfig;

pub async fn execute(args: IngestArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = super::open_store(&config).await?;
    let pipeline = IngestPipeline::new(
        Arc::new(super::build_feed(&config)),
        store,
        Arc::new(super::build_gateway(&config)?),
        Arc::new(KeywordCategorizer::default()),
        Arc::new(SystemClock),
        IngestConfig {
            page_size: config.feed.page_size,
            max_concurrent: config.general.max_concurrent,
        },
    );

    let report = pipeline.run_once().await.context("Ingestion failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Fetched {} candidates, stored {} new articles",
            report.fetched_count, report.stored_count
        );
    }

    Ok(())
}
