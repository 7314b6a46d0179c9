use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use shnoor_chat::web_server::{build_router, AppState};
use shnoor_chat::{ChatConfig, MessageResolver};
use std::sync::Arc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_for(api_base_url: &str) -> TestServer {
    let config = ChatConfig {
        company: "Shnoor International LLC".to_string(),
        api_key: Some("test-key".to_string()),
        model: "gemini-1.5-flash".to_string(),
        api_base_url: api_base_url.to_string(),
        temperature: 0.3,
        max_output_tokens: 200,
    };
    let resolver = Arc::new(MessageResolver::from_config(&config));
    let app = build_router(AppState::new(resolver, config.greeting()));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_api_chat_canned_answer() {
    let server = server_for("http://127.0.0.1:1");
    let response = server
        .post("/api/chat")
        .json(&json!({"message": "How can I contact Shnoor International LLC?"}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "role": "bot",
            "text": "You can contact Shnoor International LLC through official company email or phone channels."
        })
    );
}

#[tokio::test]
async fn test_api_chat_remote_answer() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "We trade worldwide."}]}}]
        })))
        .expect(1)
        .mount(&gemini)
        .await;

    let server = server_for(&gemini.uri());
    let response = server
        .post("/api/chat")
        .json(&json!({"message": "Which markets do you trade in?"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["text"], "We trade worldwide.");
}

#[tokio::test]
async fn test_api_chat_transport_failure() {
    let server = server_for("http://127.0.0.1:1");
    let response = server
        .post("/api/chat")
        .json(&json!({"message": "Which markets do you trade in?"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["text"], "Error connecting to AI service.");
}

#[tokio::test]
async fn test_api_chat_blank_message() {
    let server = server_for("http://127.0.0.1:1");
    let response = server
        .post("/api/chat")
        .json(&json!({"message": "   "}))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "message is empty");
}

#[tokio::test]
async fn test_index_renders_greeting() {
    let server = server_for("http://127.0.0.1:1");
    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Shnoor International LLC – AI Chatbot"));
    assert!(html.contains("How can I help you today?"));
}
