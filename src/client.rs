//! HTTP client for a running Writing Gym API

use crate::api::handlers::ExtractCriteriaResponse;
use crate::error::{Error, Result};
use crate::model::{AiAssessment, AssessDraftRequest, Context, Criterion};
use crate::session::CoachingBackend;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: error_message(status, &body),
            });
        }

        Ok(response.json().await?)
    }
}

/// `detail`, then `error`, then a generic line for the status
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };

    field("detail")
        .or_else(|| field("error"))
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

#[async_trait]
impl CoachingBackend for ApiClient {
    async fn extract_criteria(&self, context: &Context) -> Result<Vec<Criterion>> {
        let response: ExtractCriteriaResponse = self
            .post("/api/extract-criteria", &json!({ "context": context }))
            .await?;
        Ok(response.criteria)
    }

    async fn assess_draft(&self, request: &AssessDraftRequest) -> Result<AiAssessment> {
        self.post("/api/assess-draft", request).await
    }
}
