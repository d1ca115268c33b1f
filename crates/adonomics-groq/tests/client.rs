//! Integration tests for `GroqClient` using wiremock HTTP mocks.

use adonomics_groq::{
    ChatMessage, ChatRequest, FunctionDefinition, GroqClient, GroqError, Tool, ToolChoice,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GroqClient {
    GroqClient::with_base_url("gsk-test", 30, &format!("{base_url}/openai/v1"))
        .expect("client construction should not fail")
}

fn forced_tool_request() -> ChatRequest {
    ChatRequest {
        model: "llama-3.3-70b-versatile".to_string(),
        messages: vec![ChatMessage::system("analyst"), ChatMessage::user("go")],
        tools: vec![Tool::function(FunctionDefinition {
            name: "generate_report".to_string(),
            description: "Return the report".to_string(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        })],
        tool_choice: Some(ToolChoice::Function("generate_report".to_string())),
        temperature: Some(0.3),
        max_tokens: Some(4000),
    }
}

#[tokio::test]
async fn chat_sends_bearer_and_forced_tool_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer gsk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama-3.3-70b-versatile",
            "tool_choice": { "type": "function", "function": { "name": "generate_report" } },
            "max_tokens": 4000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "generate_report", "arguments": "{\"ok\":true}" }
                    }]
                }
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .chat(&forced_tool_request())
        .await
        .expect("chat should succeed");

    let calls = response.tool_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function.name, "generate_report");
    assert_eq!(calls[0].function.arguments, "{\"ok\":true}");
}

#[tokio::test]
async fn error_envelope_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "message": "Rate limit reached", "type": "tokens" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .chat(&forced_tool_request())
        .await
        .expect_err("should fail");

    match err {
        GroqError::Api {
            status,
            kind,
            message,
        } => {
            assert_eq!(status, 429);
            assert_eq!(kind.as_deref(), Some("tokens"));
            assert_eq!(message, "Rate limit reached");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .chat(&forced_tool_request())
        .await
        .expect_err("should fail");

    assert!(matches!(err, GroqError::Deserialize { .. }));
}
