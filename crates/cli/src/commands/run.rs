//! Run command - scheduled ingestion and digest delivery

use anyhow::{Context, Result};
use news_digest_domain::policy::KeywordCategorizer;
use news_digest_domain::usecases::{
    DigestAssembler, IngestConfig, IngestPipeline, PipelineScheduler, ScheduleConfig,
};
use news_digest_domain::{SummaryGateway, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use time::Time;

use crate::args::RunArgs;
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = super::open_store(&config).await?;
    let feed = Arc::new(super::build_feed(&config));
    let mailer = Arc::new(super::build_mailer(&config));
    let gateway = Arc::new(super::build_gateway(&config)?);
    let clock = Arc::new(SystemClock);

    let ingest = Arc::new(IngestPipeline::new(
        feed,
        store.clone(),
        gateway.clone(),
        Arc::new(KeywordCategorizer::default()),
        clock.clone(),
        IngestConfig {
            page_size: config.feed.page_size,
            max_concurrent: config.general.max_concurrent,
        },
    ));

    let assembler = Arc::new(DigestAssembler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        mailer,
        gateway,
        clock.clone(),
    ));

    if args.once {
        tracing::info!("Running single ingestion and digest cycle");
        let report = ingest.run_once().await?;
        tracing::info!(
            fetched = report.fetched_count,
            stored = report.stored_count,
            "Ingestion complete"
        );
        let outcomes = assembler.run_once().await?;
        tracing::info!(users = outcomes.len(), "Digest cycle complete");
        return Ok(());
    }

    let digest_time = Time::from_hms(config.schedule.digest_hour, config.schedule.digest_minute, 0)
        .context("Invalid digest schedule time")?;

    tracing::info!(
        ingest_interval_secs = config.schedule.ingest_interval_secs,
        digest_time = %digest_time,
        "Starting news-digest scheduler"
    );

    let scheduler = PipelineScheduler::start(
        ingest,
        assembler,
        clock,
        ScheduleConfig {
            ingest_interval: Duration::from_secs(config.schedule.ingest_interval_secs),
            digest_time,
        },
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to install Ctrl+C handler")?;
    tracing::info!("Shutdown signal received");

    scheduler.shutdown().await;
    tracing::info!("Scheduler stopped");

    Ok(())
}
