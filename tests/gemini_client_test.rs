use serde_json::json;
use shnoor_chat::llm_interaction::{GeminiClient, TextGenerator};
use shnoor_chat::{AwaitingFlag, ChatConfig, ChatMessage, MessageResolver, ResolveError};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn config(base_url: &str) -> ChatConfig {
    ChatConfig {
        company: "Shnoor International LLC".to_string(),
        api_key: Some("test-key".to_string()),
        model: "gemini-1.5-flash".to_string(),
        api_base_url: base_url.to_string(),
        temperature: 0.3,
        max_output_tokens: 200,
    }
}

async fn mount_response(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

#[test_log::test(tokio::test)]
async fn test_request_shape_and_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({
            "contents": [{
                "role": "user",
                "parts": [{
                    "text": "You are an AI assistant for Shnoor International LLC.\nAnswer professionally and clearly.\n\nQuestion: Do you handle customs clearance?"
                }]
            }],
            "generationConfig": {"temperature": 0.3, "maxOutputTokens": 200}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Hello!"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = MessageResolver::from_config(&config(&server.uri()));
    let flag = AwaitingFlag::default();
    let reply = resolver.resolve("Do you handle customs clearance?", &flag).await;
    assert_eq!(reply, Some(ChatMessage::bot("Hello!")));
    assert!(!flag.is_set());
}

#[tokio::test]
async fn test_empty_object_is_malformed() {
    let server = MockServer::start().await;
    mount_response(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let resolver = MessageResolver::from_config(&config(&server.uri()));
    let reply = resolver.resolve("anything else?", &AwaitingFlag::default()).await.unwrap();
    assert_eq!(reply.text, "Currently unable to generate a response.");
}

#[tokio::test]
async fn test_error_status_with_json_body_is_malformed() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })),
    )
    .await;

    let client = GeminiClient::new(&config(&server.uri()));
    let err = client.generate("prompt").await.unwrap_err();
    assert!(matches!(err, ResolveError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_non_json_body_is_transport_failure() {
    let server = MockServer::start().await;
    mount_response(
        &server,
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
    )
    .await;

    let resolver = MessageResolver::from_config(&config(&server.uri()));
    let reply = resolver.resolve("anything else?", &AwaitingFlag::default()).await.unwrap();
    assert_eq!(reply.text, "Error connecting to AI service.");
}

#[tokio::test]
async fn test_unreachable_service_is_transport_failure() {
    // Port 1 is reserved and nothing listens there.
    let client = GeminiClient::new(&config("http://127.0.0.1:1"));
    let err = client.generate("prompt").await.unwrap_err();
    assert!(matches!(err, ResolveError::TransportFailure(_)));
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "should not be used"}]}}]
        })))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config(&server.uri());
    config.api_key = Some("  ".to_string());
    let resolver = MessageResolver::new(
        config.company.clone(),
        Arc::new(GeminiClient::new(&config)),
    );
    let reply = resolver.resolve("anything else?", &AwaitingFlag::default()).await.unwrap();
    assert_eq!(reply.text, "Error connecting to AI service.");
}

#[tokio::test]
async fn test_canned_question_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = MessageResolver::from_config(&config(&server.uri()));
    let reply = resolver
        .resolve("WHAT DOES SHNOOR INTERNATIONAL LLC DO?", &AwaitingFlag::default())
        .await
        .unwrap();
    assert_eq!(
        reply.text,
        "Shnoor International LLC specializes in international trading, logistics solutions, and global business services."
    );
}
