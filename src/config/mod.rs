//! Configuration for the model provider, the API server and the coach

use crate::model::AssessmentScale;
use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::ConfigLoader;

pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Anthropic API key. Requests fail with a configuration error without it.
    pub api_key: Option<String>,
    /// Fast low-cost model by default; set `CLAUDE_MODEL` for a stronger one
    pub model: String,
    pub base_url: String,
    pub max_tokens: MaxTokens,
    pub assessment_scale: AssessmentScale,
    pub criteria: CriteriaLimits,
    pub server: ServerConfig,
}

/// Output token ceilings, sized per operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxTokens {
    pub extract_criteria: u32,
    pub assess_draft: u32,
}

impl Default for MaxTokens {
    fn default() -> Self {
        Self {
            extract_criteria: 512,
            assess_draft: 1024,
        }
    }
}

/// How many criteria the model is asked for
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for CriteriaLimits {
    fn default() -> Self {
        Self { min: 3, max: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: MaxTokens::default(),
            assessment_scale: AssessmentScale::default(),
            criteria: CriteriaLimits::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply environment overrides on top of file values
    pub fn merge_env_vars(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    pub(crate) fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(api_key);
        }

        if let Some(model) = lookup("CLAUDE_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }

        if let Some(base_url) = lookup("ANTHROPIC_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = base_url;
        }

        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(value) => self.server.port = value,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}
