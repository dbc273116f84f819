//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// news-digest: personalized news digest pipeline
#[derive(Parser, Debug)]
#[command(name = "news-digest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the scheduler (hourly ingestion, daily digests) until Ctrl+C
    Run(RunArgs),

    /// Trigger one ingestion cycle and print the counts
    Ingest(IngestArgs),

    /// Digest operations
    Digest(DigestArgs),

    /// Query stored articles with pagination and filtering
    Query(QueryArgs),

    /// Re-summarize a stored article by ID
    Resummarize(ResummarizeArgs),

    /// Seed a demo user and sample articles into the store
    SeedDemo(SeedDemoArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run one ingestion and one digest cycle, then exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DigestArgs {
    #[command(subcommand)]
    pub command: DigestCommands,
}

#[derive(Subcommand, Debug)]
pub enum DigestCommands {
    /// Assemble and dispatch digests for all users now
    Run,

    /// Show the most recent digest for a user
    Latest {
        /// User ID
        user_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Page number (1-based; invalid values fall back to 1)
    #[arg(long)]
    pub page: Option<String>,

    /// Page size (1-100; invalid values fall back to the default)
    #[arg(long)]
    pub limit: Option<String>,

    /// Case-insensitive text filter over category, title and summary
    #[arg(long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ResummarizeArgs {
    /// Article ID
    pub article_id: String,

    /// Output the updated article as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SeedDemoArgs {}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the resolved configuration
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
