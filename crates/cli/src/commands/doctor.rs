//! Doctor command - validate configuration and show status

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    store: CheckResult,
    feed: CheckResult,
    llm: CheckResult,
    email: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let (config, config_check) = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => (config, CheckResult::ok("Configuration loaded")),
        Err(e) => (
            AppConfig::default(),
            CheckResult::error(format!("Configuration failed to load: {e}")),
        ),
    };

    let store = match super::open_store(&config).await {
        Ok(_) => CheckResult::ok(format!(
            "Store ready at {}",
            config.general.db_path.display()
        )),
        Err(e) => CheckResult::error(format!("Store unavailable: {e}")),
    };

    let feed = if super::load_optional_api_key(&config.feed.api_key_env).is_some() {
        CheckResult::ok(format!("Feed key present ({})", config.feed.api_key_env))
    } else {
        CheckResult::warn(format!(
            "Feed key missing ({}); ingestion will be a no-op",
            config.feed.api_key_env
        ))
    };

    let configured_providers: Vec<&str> = config
        .llm
        .providers
        .iter()
        .filter(|p| match p.as_str() {
            "openai" => super::load_optional_api_key(&config.llm.openai.api_key_env).is_some(),
            "gemini" => super::load_optional_api_key(&config.llm.gemini.api_key_env).is_some(),
            "stub" => true,
            _ => false,
        })
        .map(String::as_str)
        .collect();

    let llm = if configured_providers.is_empty() {
        CheckResult::warn("No summarization provider configured; summaries will be skipped")
    } else {
        CheckResult::ok(format!(
            "Providers configured: {}",
            configured_providers.join(", ")
        ))
    };

    let email = if super::load_optional_api_key(&config.email.api_key_env).is_some() {
        CheckResult::ok(format!("Mail key present ({})", config.email.api_key_env))
    } else {
        CheckResult::warn(format!(
            "Mail key missing ({}); digests will not be emailed",
            config.email.api_key_env
        ))
    };

    let checks = [&config_check, &store, &feed, &llm, &email];
    let overall = if checks.iter().any(|c| c.is_error()) {
        "error"
    } else if checks.iter().any(|c| c.status == "warn") {
        "warn"
    } else {
        "ok"
    }
    .to_string();

    let report = DoctorReport {
        config: config_check,
        store,
        feed,
        llm,
        email,
        overall,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_check("config", &report.config);
        print_check("store", &report.store);
        print_check("feed", &report.feed);
        print_check("llm", &report.llm);
        print_check("email", &report.email);
        println!("\noverall: {}", report.overall);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn print_check(name: &str, check: &CheckResult) {
    println!("[{}] {}: {}", check.status, name, check.message);
}
