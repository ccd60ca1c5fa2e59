use crate::model::ContextField;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Required provider configuration is absent. Not the caller's fault.
    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("Missing required context fields: {}", join_fields(.missing))]
    IncompleteContext { missing: Vec<ContextField> },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unexpected response format: {0}")]
    MalformedProviderResponse(String),

    #[error("Failed to parse JSON response: {source}")]
    ResponseParse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid criterion at index {index}: {reason}")]
    InvalidCriteriaResponse { index: usize, reason: String },

    #[error("Missing scores for criteria: {}", .missing.join(", "))]
    IncompleteAssessment { missing: Vec<String> },

    #[error("Invalid score for criterion {id}: {value}")]
    InvalidScore { id: String, value: String },

    #[error("Model provider returned {status}: {body}")]
    Provider { status: StatusCode, body: String },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Non-success response from the writing-gym API, seen from the client side.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

pub(crate) fn join_fields(fields: &[ContextField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
