//! `serve` command

use crate::api;
use crate::config::AppConfig;
use anyhow::Result;

pub async fn run_serve_command(mut config: AppConfig, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    api::serve(&config).await?;
    Ok(())
}
