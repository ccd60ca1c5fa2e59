//! Provider envelope handling and JSON extraction from model text

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*\n?").expect("valid fence regex"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n?```\s*$").expect("valid fence regex"));

/// Pull the first text block out of a Messages API response body
pub fn extract_response_text(message: &Value) -> Result<String> {
    if message.is_null() {
        return Err(Error::MalformedProviderResponse(
            "empty response from model provider".to_string(),
        ));
    }

    let content = message
        .get("content")
        .and_then(Value::as_array)
        .filter(|blocks| !blocks.is_empty())
        .ok_or_else(|| Error::MalformedProviderResponse("missing content array".to_string()))?;

    let first = &content[0];
    match (
        first.get("type").and_then(Value::as_str),
        first.get("text").and_then(Value::as_str),
    ) {
        (Some("text"), Some(text)) => Ok(text.to_string()),
        _ => Err(Error::MalformedProviderResponse(
            "expected text content".to_string(),
        )),
    }
}

/// Remove a surrounding ```json fence if the model added one
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    let without_leading = LEADING_FENCE.replace(text, "");
    TRAILING_FENCE
        .replace(&without_leading, "")
        .trim()
        .to_string()
}

/// Parse model text as JSON, keeping the raw text on failure
pub fn parse_json_response(text: &str) -> Result<Value> {
    let stripped = strip_code_fences(text);
    serde_json::from_str(&stripped).map_err(|source| Error::ResponseParse {
        source,
        raw: text.to_string(),
    })
}
