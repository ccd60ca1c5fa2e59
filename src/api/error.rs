//! HTTP error responses

use crate::error::Error;
use crate::model::ContextField;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// JSON body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<ContextField>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.into(),
                detail: None,
                missing: Vec::new(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    /// Map a coaching error to its response. `failure` titles downstream errors.
    pub fn from_error(err: Error, failure: &str) -> Self {
        match err {
            Error::Configuration(detail) => {
                error!("Environment configuration error: {}", detail);
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable")
            }
            Error::IncompleteContext { missing } => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorBody {
                    error: "Missing required context fields".to_string(),
                    detail: None,
                    missing,
                },
            },
            Error::Validation(message) => Self::bad_request(message),
            other => {
                error!("{}: {}", failure, other);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        error: failure.to_string(),
                        detail: Some(other.to_string()),
                        missing: Vec::new(),
                    },
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        let error = match rejection {
            JsonRejection::JsonSyntaxError(_) => "Request body must be valid JSON",
            _ => "Malformed request body",
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: error.to_string(),
                detail: Some(rejection.body_text()),
                missing: Vec::new(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
