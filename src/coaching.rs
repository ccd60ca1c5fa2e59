//! Criteria extraction and draft assessment
//!
//! Each operation is prompt → one completion call → JSON parse → validation.
//! Any failure is terminal; nothing partial is returned.

use crate::claude::response::parse_json_response;
use crate::claude::{CompletionClient, PromptBuilder};
use crate::config::{AppConfig, CriteriaLimits, MaxTokens};
use crate::error::{Error, Result};
use crate::model::{AiAssessment, AssessDraftRequest, AssessmentScale, Context, Criterion};
use crate::validation::{validate_assessment_response, validate_criteria_response};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct CoachingService<C> {
    client: C,
    prompts: PromptBuilder,
    max_tokens: MaxTokens,
    scale: AssessmentScale,
    limits: CriteriaLimits,
}

impl<C: CompletionClient> CoachingService<C> {
    pub fn new(client: C, config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client,
            prompts: PromptBuilder::from_config(config)?,
            max_tokens: config.max_tokens,
            scale: config.assessment_scale,
            limits: config.criteria,
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Whether the completion client can make calls at all
    pub fn ensure_ready(&self) -> Result<()> {
        self.client.ensure_ready()
    }

    /// Derive rateable criteria from a validated context
    pub async fn extract_criteria(&self, context: &Context) -> Result<Vec<Criterion>> {
        let missing = context.missing_fields();
        if !missing.is_empty() {
            return Err(Error::IncompleteContext { missing });
        }

        let prompt = self.prompts.criteria_prompt(context)?;
        debug!("Criteria prompt is {} chars", prompt.len());

        let start = Instant::now();
        let text = self
            .client
            .complete(&prompt, self.max_tokens.extract_criteria)
            .await?;
        let parsed = parse_json_response(&text)?;
        let mut criteria = validate_criteria_response(&parsed)?;

        if criteria.len() > self.limits.max {
            warn!(
                "Model returned {} criteria, keeping the first {}",
                criteria.len(),
                self.limits.max
            );
            criteria.truncate(self.limits.max);
        }
        if criteria.len() < self.limits.min {
            warn!(
                "Model returned {} criteria, fewer than the {} requested",
                criteria.len(),
                self.limits.min
            );
        }

        for criterion in &mut criteria {
            criterion.scale = self.scale;
        }

        info!(
            "Extracted {} criteria in {:?}",
            criteria.len(),
            start.elapsed()
        );
        Ok(criteria)
    }

    /// Score a draft against its criteria
    pub async fn assess_draft(&self, request: &AssessDraftRequest) -> Result<AiAssessment> {
        if request.draft.trim().is_empty() {
            return Err(Error::Validation(
                "Draft is required and must be non-empty".to_string(),
            ));
        }
        if request.criteria.is_empty() {
            return Err(Error::Validation(
                "Criteria array is required and must not be empty".to_string(),
            ));
        }
        let missing = request.context.missing_fields();
        if !missing.is_empty() {
            return Err(Error::IncompleteContext { missing });
        }

        let prompt = self.prompts.assessment_prompt(request)?;
        debug!("Assessment prompt is {} chars", prompt.len());

        let start = Instant::now();
        let text = self
            .client
            .complete(&prompt, self.max_tokens.assess_draft)
            .await?;
        let parsed = parse_json_response(&text)?;
        let assessment = validate_assessment_response(&parsed, &request.criteria)?;

        info!(
            "Assessed draft against {} criteria in {:?}",
            request.criteria.len(),
            start.elapsed()
        );
        Ok(assessment)
    }
}
