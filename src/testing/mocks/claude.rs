//! Mock completion client for testing

use crate::claude::CompletionClient;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A recorded `complete` call
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub prompt: String,
    pub max_tokens: u32,
}

/// Completion client returning queued responses in order
#[derive(Clone)]
pub struct MockCompletionClient {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
    configured: bool,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            configured: true,
        }
    }

    /// A client whose credential is missing
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub async fn add_response(&self, text: &str) {
        self.responses.lock().await.push_back(Ok(text.to_string()));
    }

    pub async fn add_error(&self, error: Error) {
        self.responses.lock().await.push_back(Err(error));
    }

    pub async fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    fn ensure_ready(&self) -> Result<()> {
        if self.configured {
            Ok(())
        } else {
            Err(Error::Configuration(
                "ANTHROPIC_API_KEY is not set".to_string(),
            ))
        }
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.ensure_ready()?;
        self.calls.lock().await.push(CompletionCall {
            prompt: prompt.to_string(),
            max_tokens,
        });
        self.responses.lock().await.pop_front().unwrap_or_else(|| {
            Err(Error::MalformedProviderResponse(
                "no mock response queued".to_string(),
            ))
        })
    }
}
