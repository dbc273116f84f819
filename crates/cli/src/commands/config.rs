//! Config command - example generation and inspection

use anyhow::{Context, Result, bail};

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

pub async fn execute(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }

            std::fs::write(&path, AppConfig::example_toml())
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!("Wrote example configuration to {}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = AppConfig::load(None)?;
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
