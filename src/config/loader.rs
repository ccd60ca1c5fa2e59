use super::AppConfig;
use crate::error::Result;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CONFIG_FILE_NAME: &str = "writing-gym.toml";

/// Resolves and reads the configuration file, then layers env vars on top
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    search_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(search_dir: impl Into<PathBuf>) -> Self {
        Self {
            explicit_path: None,
            search_dir: search_dir.into(),
        }
    }

    /// Use this file instead of searching. It must exist.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub async fn load(&self) -> Result<AppConfig> {
        let mut config = self.load_file().await?;
        config.merge_env_vars();
        Ok(config)
    }

    /// File values only, without environment overrides
    pub async fn load_file(&self) -> Result<AppConfig> {
        match self.resolve_path() {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                read_config(&path).await
            }
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(AppConfig::default())
            }
        }
    }

    fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit_path {
            return Some(path.clone());
        }

        let local = self.search_dir.join(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        global_config_path().filter(|p| p.exists())
    }
}

/// `config.toml` in the platform config directory
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "writing-gym", "writing-gym")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

async fn read_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).await?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}
