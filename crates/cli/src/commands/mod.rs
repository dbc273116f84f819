//! CLI command implementations

pub mod config;
pub mod digest;
pub mod doctor;
pub mod ingest;
pub mod query;
pub mod resummarize;
pub mod run;
pub mod seed;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use news_digest_adapters::feed::NewsApiSource;
use news_digest_adapters::llm::{GeminiBackend, LlmConfig, OpenAiBackend, StubBackend};
use news_digest_adapters::mail::SendGridMailer;
use news_digest_adapters::store::SqliteStore;
use news_digest_domain::{CompletionBackend, SummaryGateway};
use secrecy::SecretString;

use crate::config::AppConfig;

/// Read an optional API key from the configured env var
///
/// Missing or empty values mean "unconfigured", never an error: every
/// external collaborator degrades to a soft no-op without its credential.
pub(crate) fn load_optional_api_key(env_var: &str) -> Option<SecretString> {
    if env_var.trim().is_empty() {
        return None;
    }
    std::env::var(env_var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .map(|key| SecretString::new(key.into()))
}

pub(crate) async fn open_store(config: &AppConfig) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::new(&config.general.db_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open store at {}",
                config.general.db_path.display()
            )
        })?;
    Ok(Arc::new(store))
}

pub(crate) fn build_feed(config: &AppConfig) -> NewsApiSource {
    NewsApiSource::with_base_url(
        load_optional_api_key(&config.feed.api_key_env),
        config.feed.base_url.clone(),
        config.feed.language.clone(),
    )
}

pub(crate) fn build_mailer(config: &AppConfig) -> SendGridMailer {
    SendGridMailer::new(
        load_optional_api_key(&config.email.api_key_env),
        Some(config.email.from.clone()),
    )
}

/// Assemble the summarization gateway in configured fallback order
pub(crate) fn build_gateway(config: &AppConfig) -> Result<SummaryGateway> {
    let mut backends: Vec<Arc<dyn CompletionBackend>> = Vec::new();

    for provider in &config.llm.providers {
        match provider.as_str() {
            "openai" => {
                backends.push(Arc::new(OpenAiBackend::with_base_url(
                    load_optional_api_key(&config.llm.openai.api_key_env),
                    config.llm.openai.base_url.clone(),
                    LlmConfig {
                        model: config.llm.openai.model.clone(),
                        max_output_tokens: config.llm.max_output_tokens,
                        timeout_secs: config.llm.timeout_secs,
                    },
                )));
            }
            "gemini" => {
                backends.push(Arc::new(GeminiBackend::new(
                    load_optional_api_key(&config.llm.gemini.api_key_env),
                    LlmConfig {
                        model: config.llm.gemini.model.clone(),
                        max_output_tokens: config.llm.max_output_tokens,
                        timeout_secs: config.llm.timeout_secs,
                    },
                )));
            }
            "stub" => {
                backends.push(Arc::new(StubBackend::default()));
            }
            other => bail!("Unknown summarization provider: {other}"),
        }
    }

    Ok(SummaryGateway::new(backends))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = AppConfig::default();
        config.llm.providers = vec!["frontier".to_string()];

        assert!(build_gateway(&config).is_err());
    }

    #[test]
    fn default_providers_build() {
        let config = AppConfig::default();
        assert!(build_gateway(&config).is_ok());
    }
}
