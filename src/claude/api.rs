//! Claude Messages API client

use super::response::{extract_response_text, strip_code_fences};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A text-completion oracle
///
/// Implementations return the model's text with any surrounding code fence
/// removed; parsing it is up to the caller.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Fails with [`Error::Configuration`] when the client cannot make calls
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for std::sync::Arc<T> {
    fn ensure_ready(&self) -> Result<()> {
        (**self).ensure_ready()
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        (**self).complete(prompt, max_tokens).await
    }
}

/// Claude API request
#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Claude API client. One request per call, no retries.
pub struct ClaudeClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl ClaudeClient {
    /// Create a new Claude client
    pub fn new(api_key: Option<String>, model: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Configuration("ANTHROPIC_API_KEY is not set".to_string())
        })
    }

    /// Make a single API request and return the raw response body
    async fn make_request(&self, api_key: &str, request: &ClaudeRequest<'_>) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider { status, body });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::MalformedProviderResponse(format!("response body is not JSON: {e}"))
        })
    }
}

#[async_trait]
impl CompletionClient for ClaudeClient {
    fn ensure_ready(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let api_key = self.api_key()?;
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(
            model = %self.model,
            max_tokens,
            prompt_chars = prompt.len(),
            "Sending completion request"
        );

        let message = self.make_request(api_key, &request).await?;
        let text = extract_response_text(&message)?;
        Ok(strip_code_fences(&text))
    }
}
