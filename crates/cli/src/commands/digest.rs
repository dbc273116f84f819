//! Digest commands - manual run and latest lookup

use anyhow::{Context, Result, bail};
use news_digest_domain::usecases::{DigestAssembler, latest_digest};
use news_digest_domain::{DigestOutcome, StoreError, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::args::{DigestArgs, DigestCommands};
use crate::config::AppConfig;

pub async fn execute(args: DigestArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        DigestCommands::Run => run_now(config_path).await,
        DigestCommands::Latest { user_id, json } => show_latest(config_path, &user_id, json).await,
    }
}

async fn run_now(config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let store = super::open_store(&config).await?;
    let assembler = DigestAssembler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(super::build_mailer(&config)),
        Arc::new(super::build_gateway(&config)?),
        Arc::new(SystemClock),
    );

    let outcomes = assembler.run_once().await.context("Digest run failed")?;

    let mut delivered = 0usize;
    let mut emailed = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for (_, outcome) in &outcomes {
        match outcome {
            DigestOutcome::Delivered { emailed: sent, .. } => {
                delivered += 1;
                if *sent {
                    emailed += 1;
                }
            }
            DigestOutcome::Skipped { .. } => skipped += 1,
            DigestOutcome::Failed { .. } => failed += 1,
        }
    }

    println!(
        "Digests: {delivered} created ({emailed} emailed), {skipped} users skipped, {failed} failed"
    );

    Ok(())
}

async fn show_latest(config_path: Option<PathBuf>, user_id: &str, json: bool) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let user_id = Uuid::parse_str(user_id).context("Invalid user ID")?;

    let store = super::open_store(&config).await?;

    let digest = match latest_digest(store.as_ref(), user_id).await {
        Ok(digest) => digest,
        Err(StoreError::NotFound(_)) => bail!("No digest found for user {user_id}"),
        Err(e) => return Err(e).context("Failed to load digest"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&digest)?);
    } else {
        println!("Digest {} ({})", digest.id, digest.date);
        for article in &digest.articles {
            println!("  [{}] {}", article.category, article.title);
        }
        if let Some(summary) = &digest.summary_text {
            println!("\n{summary}");
        }
    }

    Ok(())
}
