//! Integration tests for the completion client and fallback flow.

use hotspot_chat::{answer_question, ChatError, CompletionClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CompletionClient {
    CompletionClient::with_base_url("test-key", "gpt-4o-mini", 10, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn complete_returns_assistant_content() {
    let server = MockServer::start().await;

    let body = json!({
        "choices": [
            { "message": { "role": "assistant", "content": "High Potential location." } }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let reply = client
        .complete("Is this good for a cafe?")
        .await
        .expect("should complete");
    assert_eq!(reply, "High Potential location.");
}

#[tokio::test]
async fn complete_with_no_choices_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.complete("hello").await.expect_err("should fail");
    assert!(matches!(err, ChatError::EmptyCompletion));
}

#[tokio::test]
async fn answer_question_uses_model_when_available() {
    let server = MockServer::start().await;

    let body = json!({
        "choices": [
            { "message": { "role": "assistant", "content": "The Verdict: High Potential." } }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let analysis = json!({ "opportunity_score": 75, "business_type": "cafe" });
    let answer = answer_question(Some(&client), "Is this good?", Some(&analysis)).await;

    assert!(answer.ai_powered);
    assert_eq!(answer.response, "The Verdict: High Potential.");
    assert!(answer.error.is_none());
}

#[tokio::test]
async fn answer_question_degrades_to_template_on_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let analysis = json!({
        "opportunity_score": 80,
        "business_type": "cafe",
        "competitors": { "count": 2 },
        "footfall_proxy": "high"
    });
    let answer = answer_question(Some(&client), "Is this good?", Some(&analysis)).await;

    assert!(!answer.ai_powered);
    assert!(answer.response.contains("strong potential"));
    assert_eq!(
        answer.error.as_deref(),
        Some("AI service temporarily unavailable")
    );
}

#[tokio::test]
async fn answer_question_without_client_uses_template() {
    let answer = answer_question(None, "Is this good?", None).await;
    assert!(!answer.ai_powered);
    assert!(answer.response.contains("select a location"));
}
