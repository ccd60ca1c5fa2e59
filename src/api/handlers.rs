//! Request handlers

use super::error::ApiError;
use super::AppState;
use crate::model::{AiAssessment, AssessDraftRequest, Criterion, PriorAssessment};
use crate::validation::validate_context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const EXTRACT_FAILED: &str = "Failed to extract criteria";
const ASSESS_FAILED: &str = "Failed to assess draft";

#[derive(Debug, Deserialize)]
pub struct ExtractCriteriaBody {
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractCriteriaResponse {
    pub criteria: Vec<Criterion>,
}

/// Fields stay loosely typed so that each one gets its own 400 message
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessDraftBody {
    #[serde(default)]
    pub draft: Option<Value>,
    #[serde(default)]
    pub criteria: Option<Vec<Criterion>>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub criterion_notes: BTreeMap<String, String>,
    #[serde(default)]
    pub previous_assessment: Option<PriorAssessment>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub message: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: "Writing Gym API".to_string(),
        message: "POST /api/extract-criteria, then /api/assess-draft".to_string(),
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

pub async fn extract_criteria(
    State(state): State<AppState>,
    body: Result<Json<ExtractCriteriaBody>, JsonRejection>,
) -> Result<Json<ExtractCriteriaResponse>, ApiError> {
    let Json(body) = body?;
    let context = validate_context(body.context.as_ref())
        .map_err(|e| ApiError::from_error(e, EXTRACT_FAILED))?;

    let criteria = state
        .service
        .extract_criteria(&context)
        .await
        .map_err(|e| ApiError::from_error(e, EXTRACT_FAILED))?;

    Ok(Json(ExtractCriteriaResponse { criteria }))
}

pub async fn assess_draft(
    State(state): State<AppState>,
    body: Result<Json<AssessDraftBody>, JsonRejection>,
) -> Result<Json<AiAssessment>, ApiError> {
    state
        .service
        .ensure_ready()
        .map_err(|e| ApiError::from_error(e, ASSESS_FAILED))?;

    let Json(body) = body?;
    let draft = match body.draft {
        Some(Value::String(draft)) if !draft.trim().is_empty() => draft,
        _ => {
            return Err(ApiError::bad_request(
                "Draft is required and must be non-empty",
            ))
        }
    };
    let criteria = body
        .criteria
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Criteria array is required and must not be empty"))?;
    let context = validate_context(body.context.as_ref())
        .map_err(|e| ApiError::from_error(e, ASSESS_FAILED))?;

    let request = AssessDraftRequest {
        draft,
        criteria,
        context,
        criterion_notes: body.criterion_notes,
        previous_assessment: body.previous_assessment,
    };

    let assessment = state
        .service
        .assess_draft(&request)
        .await
        .map_err(|e| ApiError::from_error(e, ASSESS_FAILED))?;

    Ok(Json(assessment))
}
