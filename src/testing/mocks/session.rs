//! Scripted coaching backend for driving sessions in tests

use crate::error::{Error, Result};
use crate::model::{AiAssessment, AssessDraftRequest, Context, Criterion};
use crate::session::CoachingBackend;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Backend returning queued results and recording every request it saw
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    criteria: Arc<Mutex<VecDeque<Result<Vec<Criterion>>>>>,
    assessments: Arc<Mutex<VecDeque<Result<AiAssessment>>>>,
    contexts: Arc<Mutex<Vec<Context>>>,
    requests: Arc<Mutex<Vec<AssessDraftRequest>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_criteria(&self, result: Result<Vec<Criterion>>) {
        self.criteria.lock().await.push_back(result);
    }

    pub async fn push_assessment(&self, result: Result<AiAssessment>) {
        self.assessments.lock().await.push_back(result);
    }

    pub async fn extract_contexts(&self) -> Vec<Context> {
        self.contexts.lock().await.clone()
    }

    pub async fn assess_requests(&self) -> Vec<AssessDraftRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CoachingBackend for ScriptedBackend {
    async fn extract_criteria(&self, context: &Context) -> Result<Vec<Criterion>> {
        self.contexts.lock().await.push(context.clone());
        self.criteria
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(Error::InvalidResponse("no criteria scripted".to_string())))
    }

    async fn assess_draft(&self, request: &AssessDraftRequest) -> Result<AiAssessment> {
        self.requests.lock().await.push(request.clone());
        self.assessments
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(Error::InvalidResponse("no assessment scripted".to_string())))
    }
}
