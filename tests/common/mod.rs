//! Common test utilities and helpers

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use writing_gym::api::{create_router, AppState};
use writing_gym::claude::CompletionClient;
use writing_gym::coaching::CoachingService;
use writing_gym::config::AppConfig;
use writing_gym::model::{AiAssessment, Scores};
use writing_gym::testing::mocks::MockCompletionClient;

/// Serve the API on an ephemeral port, backed by `client`
pub async fn spawn_server(client: &MockCompletionClient) -> SocketAddr {
    let client: Arc<dyn CompletionClient> = Arc::new(client.clone());
    let service = CoachingService::new(client, &AppConfig::default()).unwrap();
    let router = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub fn scores(pairs: &[(&str, u8)]) -> Scores {
    pairs.iter().map(|(id, s)| (id.to_string(), *s)).collect()
}

/// AI assessment with a one-line reasoning per score
pub fn assessment(pairs: &[(&str, u8)]) -> AiAssessment {
    AiAssessment {
        scores: scores(pairs),
        reasoning: pairs
            .iter()
            .map(|(id, s)| (id.to_string(), format!("Scored {s}")))
            .collect(),
        ..Default::default()
    }
}

/// Model reply scoring the given ids, in the shape the assessment prompt asks for
pub fn assessment_reply(pairs: &[(&str, u8)]) -> String {
    let scores: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(id, s)| (id.to_string(), serde_json::json!(s)))
        .collect();
    let reasoning: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(id, _)| (id.to_string(), serde_json::json!("Reasonable")))
        .collect();
    serde_json::json!({
        "scores": scores,
        "reasoning": reasoning,
        "suggestions": {},
        "qualityFlags": []
    })
    .to_string()
}
