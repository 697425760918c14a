//! `ChatClient` wire behaviour against `wiremock`.

mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::chat_reply;
use localfluence::PipelineError;
use localfluence::api::{ChatClient, ChatModel, ChatRequest};
use localfluence::config::ModelSettings;

fn settings() -> ModelSettings {
    ModelSettings {
        model: "gpt-4-0125-preview".to_string(),
        temperature: 0.9,
    }
}

fn client(server: &MockServer) -> ChatClient {
    ChatClient::new(
        reqwest::Client::new(),
        format!("{}/v1/chat/completions", server.uri()),
        "sk-test",
        "openai",
    )
}

#[tokio::test]
async fn posts_model_messages_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4-0125-preview",
            "temperature": 0.9,
            "messages": [
                {"role": "system", "content": "be cinematic"},
                {"role": "user", "content": "a diner"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("neon booths at dusk")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .complete(&ChatRequest::new(settings(), "be cinematic", "a diner"))
        .await
        .expect("reply");
    assert_eq!(reply, "neon booths at dusk");
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&ChatRequest::new(settings(), "s", "u"))
        .await
        .expect_err("401");
    assert!(matches!(err, PipelineError::UnexpectedStatus { status: 401, .. }), "got {err:?}");
}

#[tokio::test]
async fn error_object_in_success_body_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"message": "The model is overloaded"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&ChatRequest::new(settings(), "s", "u"))
        .await
        .expect_err("provider error");
    assert!(err.to_string().contains("overloaded"));
}
