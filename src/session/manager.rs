//! Session manager implementation
//!
//! Drives a [`Session`] against a [`CoachingBackend`]: applies a transition,
//! runs the effect it returned and feeds the outcome back into the session.

use super::state::{Effect, Session, SessionError};
use crate::claude::CompletionClient;
use crate::coaching::CoachingService;
use crate::error::Result;
use crate::model::{AiAssessment, AssessDraftRequest, Context, Criterion, SelfAssessment};
use async_trait::async_trait;
use tracing::{debug, warn};

/// The two coaching requests a session issues
#[async_trait]
pub trait CoachingBackend: Send + Sync {
    async fn extract_criteria(&self, context: &Context) -> Result<Vec<Criterion>>;

    async fn assess_draft(&self, request: &AssessDraftRequest) -> Result<AiAssessment>;
}

#[async_trait]
impl<C: CompletionClient> CoachingBackend for CoachingService<C> {
    async fn extract_criteria(&self, context: &Context) -> Result<Vec<Criterion>> {
        CoachingService::extract_criteria(self, context).await
    }

    async fn assess_draft(&self, request: &AssessDraftRequest) -> Result<AiAssessment> {
        CoachingService::assess_draft(self, request).await
    }
}

/// Outcome of a user action once its request (if any) has settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    CriteriaReady,
    AwaitingSelfAssessment { iteration_id: u32 },
    Assessed { iteration_id: u32 },
    /// The request failed; the message is also recorded on the session
    RequestFailed { message: String },
}

/// Owns one session and the backend its effects run against
pub struct SessionManager<B> {
    session: Session,
    backend: B,
}

impl<B: CoachingBackend> SessionManager<B> {
    pub fn new(backend: B) -> Self {
        Self::with_session(backend, Session::new())
    }

    pub fn with_session(backend: B, session: Session) -> Self {
        Self { session, backend }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn update_context(&mut self, context: Context) -> std::result::Result<(), SessionError> {
        self.session.update_context(context)
    }

    pub fn set_note(&mut self, criterion_id: &str, note: &str) -> std::result::Result<(), SessionError> {
        self.session.set_note(criterion_id, note)
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Validate the context and extract criteria for it
    pub async fn submit_context(&mut self) -> std::result::Result<Progress, SessionError> {
        let effect = self.session.submit_context()?;
        Ok(self.run(effect).await)
    }

    /// Start a new iteration. The first one stops for a self-assessment.
    pub async fn submit_draft(&mut self, draft: &str) -> std::result::Result<Progress, SessionError> {
        let effect = self.session.submit_draft(draft)?;
        Ok(self.run(effect).await)
    }

    pub async fn submit_self_assessment(
        &mut self,
        iteration_id: u32,
        scores: SelfAssessment,
    ) -> std::result::Result<Progress, SessionError> {
        let effect = self.session.submit_self_assessment(iteration_id, scores)?;
        Ok(self.run(effect).await)
    }

    async fn run(&mut self, effect: Effect) -> Progress {
        match effect {
            Effect::None => match self.session.in_flight() {
                Some(iteration_id) => Progress::AwaitingSelfAssessment { iteration_id },
                None => Progress::CriteriaReady,
            },
            Effect::ExtractCriteria(context) => self.run_extraction(context).await,
            Effect::AssessDraft {
                iteration_id,
                request,
            } => self.run_assessment(iteration_id, request).await,
        }
    }

    async fn run_extraction(&mut self, context: Context) -> Progress {
        let outcome = match self.backend.extract_criteria(&context).await {
            Ok(criteria) => self
                .session
                .criteria_extracted(criteria)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => {
                debug!("Session has {} criteria", self.session.criteria().len());
                Progress::CriteriaReady
            }
            Err(message) => {
                warn!("Criteria extraction failed: {}", message);
                self.session.request_failed(message.clone());
                Progress::RequestFailed { message }
            }
        }
    }

    async fn run_assessment(&mut self, iteration_id: u32, request: AssessDraftRequest) -> Progress {
        let outcome = match self.backend.assess_draft(&request).await {
            Ok(assessment) => self
                .session
                .assessment_received(iteration_id, assessment)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => Progress::Assessed { iteration_id },
            Err(message) => {
                warn!("Assessment of iteration {} failed: {}", iteration_id, message);
                if let Err(e) = self.session.assessment_failed(iteration_id, message.clone()) {
                    debug!("Ignoring failure for settled iteration: {}", e);
                }
                Progress::RequestFailed { message }
            }
        }
    }
}
