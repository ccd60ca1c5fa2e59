//! Testing utilities and fixtures
//!
//! Canned contexts, criteria and model replies shared by unit and
//! integration tests.

pub mod mocks;

use crate::model::{Context, Criterion};
use mocks::MockCompletionClient;

/// Test fixture for common scenarios
pub struct TestFixtures;

impl TestFixtures {
    /// The budget-request email used throughout the tests
    pub fn budget_context() -> Context {
        Context::new("my manager", "approve budget", "sounding pushy", "email")
    }

    pub fn two_criteria() -> Vec<Criterion> {
        vec![
            Criterion::new("c1", "The budget ask is explicit"),
            Criterion::new("c2", "The tone stays collaborative, not pushy"),
        ]
    }

    /// Model reply carrying three criteria, fenced the way models often answer
    pub fn criteria_reply() -> String {
        r#"```json
{"criteria": [
  {"id": "1", "description": "The budget ask is stated in the opening lines", "extracted_from": "intent"},
  {"id": "2", "description": "The tone stays collaborative rather than demanding", "extracted_from": "concerns"},
  {"id": "3", "description": "The email is short enough for a busy manager", "extracted_from": "audience"}
]}
```"#
            .to_string()
    }

    /// Model reply scoring `c1` and `c2`
    pub fn assessment_reply(c1: u8, c2: u8) -> String {
        serde_json::json!({
            "scores": {"c1": c1, "c2": c2},
            "reasoning": {"c1": "The ask sits in the last paragraph", "c2": "Warm and direct"},
            "suggestions": {"c1": "Could the ask open the email?", "c2": null},
            "qualityFlags": []
        })
        .to_string()
    }

    /// A completion client with the given replies queued
    pub async fn client_with(replies: &[String]) -> MockCompletionClient {
        let client = MockCompletionClient::new();
        for reply in replies {
            client.add_response(reply).await;
        }
        client
    }
}
