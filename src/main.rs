//! SplitX Video Splitter
//!
//! Splits a video into fixed-length segments without re-encoding.
//!
//! # Usage
//!
//! ```bash
//! splitter split -i lecture.mp4 -d 120 -o parts --zip
//! splitter inspect -i lecture.mp4 --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use splitx_cli::cli::{commands, Cli, Commands};
use splitx_cli::config_initialization::initialize_configuration_hierarchy;
use splitx_cli::utils::logging::LoggingSystem;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli)?;
    let logging = LoggingSystem::new(loaded.config.logging.clone());
    logging.initialize()?;
    logging.log_system_info();

    if let Some(path) = &loaded.file {
        info!("Loaded configuration from: {}", path.display());
    }
    info!(
        env_overrides = loaded.env_overrides,
        cli_overrides = loaded.cli_overrides,
        "Configuration hierarchy initialized"
    );

    match cli.command {
        Commands::Split(args) => {
            info!("Executing split command");
            commands::split(args, &loaded.config).await
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args, &loaded.config).await
        }
    }
}
