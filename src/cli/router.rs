//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::{run_coach_command, run_serve_command};
use crate::config::ConfigLoader;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

/// Load configuration, then run the chosen command
pub async fn execute_command(command: Commands, config_path: Option<PathBuf>) -> Result<()> {
    let mut loader = ConfigLoader::new(std::env::current_dir()?);
    if let Some(path) = config_path {
        loader = loader.with_path(path);
    }
    let config = loader.load().await.context("Failed to load configuration")?;
    debug!("Using model {} at {}", config.model, config.base_url);

    match command {
        Commands::Serve { port } => run_serve_command(config, port).await,
        Commands::Coach { server } => run_coach_command(config, server).await,
    }
}
