//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub llm: LlmSection,

    #[serde(default)]
    pub email: EmailConfig,

    #[serde(default)]
    pub schedule: ScheduleSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_feed_base_url")]
    pub base_url: String,

    #[serde(default = "default_feed_language")]
    pub language: String,

    #[serde(default = "default_feed_page_size")]
    pub page_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_feed_api_key_env(),
            base_url: default_feed_base_url(),
            language: default_feed_language(),
            page_size: default_feed_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    /// Fallback order; earlier providers are tried first
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
            openai: OpenAiConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_api_key_env(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_api_key_env(),
            model: default_gemini_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_email_from")]
    pub from: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_email_api_key_env(),
            from: default_email_from(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSection {
    #[serde(default = "default_ingest_interval")]
    pub ingest_interval_secs: u64,

    /// UTC hour of the daily digest run
    #[serde(default = "default_digest_hour")]
    pub digest_hour: u8,

    #[serde(default)]
    pub digest_minute: u8,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            ingest_interval_secs: default_ingest_interval(),
            digest_hour: default_digest_hour(),
            digest_minute: 0,
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./news-digest.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_concurrent() -> usize {
    4
}

fn default_feed_api_key_env() -> String {
    "NEWS_API_KEY".to_string()
}

fn default_feed_base_url() -> String {
    "https://newsapi.org".to_string()
}

fn default_feed_language() -> String {
    "en".to_string()
}

fn default_feed_page_size() -> u32 {
    20
}

fn default_providers() -> Vec<String> {
    vec!["openai".to_string(), "gemini".to_string()]
}

fn default_max_output_tokens() -> u32 {
    600
}

fn default_llm_timeout() -> u64 {
    45
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_gemini_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_email_api_key_env() -> String {
    "SENDGRID_API_KEY".to_string()
}

fn default_email_from() -> String {
    "no-reply@news-digest.app".to_string()
}

fn default_ingest_interval() -> u64 {
    3600
}

fn default_digest_hour() -> u8 {
    20
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("NEWS_DIGEST")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# news-digest configuration

[general]
db_path = "./news-digest.sqlite"
log_level = "info"
max_concurrent = 4

[feed]
# API key is read from this env var; absent key means ingestion is a no-op
api_key_env = "NEWS_API_KEY"
base_url = "https://newsapi.org"
language = "en"
page_size = 20

[llm]
# Fallback order; earlier providers are tried first
providers = ["openai", "gemini"]
max_output_tokens = 600
timeout_secs = 45

[llm.openai]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"

[llm.gemini]
api_key_env = "GEMINI_API_KEY"
model = "gemini-2.0-flash"

[email]
api_key_env = "SENDGRID_API_KEY"
from = "no-reply@news-digest.app"

[schedule]
ingest_interval_secs = 3600
# Daily digest fire time (UTC)
digest_hour = 20
digest_minute = 0
"#
        .to_string()
    }
}
