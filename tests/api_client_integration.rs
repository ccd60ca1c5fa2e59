//! Session manager talking to a live server through `ApiClient`

mod common;

use common::{assessment_reply, scores, spawn_server};
use writing_gym::client::ApiClient;
use writing_gym::error::Error;
use writing_gym::session::{CoachingBackend, Progress, SessionManager};
use writing_gym::testing::mocks::MockCompletionClient;
use writing_gym::testing::TestFixtures;

#[tokio::test]
async fn test_session_over_http() {
    let client = TestFixtures::client_with(&[
        TestFixtures::criteria_reply(),
        assessment_reply(&[("1", 3), ("2", 4), ("3", 2)]),
        assessment_reply(&[("1", 4), ("2", 4), ("3", 3)]),
    ])
    .await;
    let addr = spawn_server(&client).await;

    let api = ApiClient::new(format!("http://{addr}")).unwrap();
    let mut manager = SessionManager::new(api);
    manager
        .update_context(TestFixtures::budget_context())
        .unwrap();

    assert_eq!(manager.submit_context().await.unwrap(), Progress::CriteriaReady);
    assert_eq!(manager.session().criteria().len(), 3);

    manager.submit_draft("Hi Sam").await.unwrap();
    let progress = manager
        .submit_self_assessment(1, scores(&[("1", 4), ("2", 4), ("3", 4)]))
        .await
        .unwrap();
    assert_eq!(progress, Progress::Assessed { iteration_id: 1 });

    let progress = manager.submit_draft("Hi Sam, revised").await.unwrap();
    assert_eq!(progress, Progress::Assessed { iteration_id: 2 });

    let calls = client.calls().await;
    assert_eq!(calls.len(), 3);
    assert!(!calls[1].prompt.contains("Assessment of the previous revision"));
    assert!(calls[2].prompt.contains("Assessment of the previous revision"));
}

#[tokio::test]
async fn test_server_errors_surface_detail() {
    let client = MockCompletionClient::new();
    client
        .add_response(r#"{"scores": {"c1": 9, "c2": 3}, "reasoning": {}}"#)
        .await;
    let addr = spawn_server(&client).await;
    let api = ApiClient::new(format!("http://{addr}")).unwrap();

    let request = writing_gym::model::AssessDraftRequest {
        draft: "Hi Sam".to_string(),
        criteria: TestFixtures::two_criteria(),
        context: TestFixtures::budget_context(),
        criterion_notes: Default::default(),
        previous_assessment: None,
    };

    match api.assess_draft(&request).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message, "Invalid score for criterion c1: 9");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unconfigured_server_is_503() {
    let client = MockCompletionClient::unconfigured();
    let addr = spawn_server(&client).await;
    let api = ApiClient::new(format!("http://{addr}")).unwrap();

    match api.extract_criteria(&TestFixtures::budget_context()).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "Service temporarily unavailable");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
