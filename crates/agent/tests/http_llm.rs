use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use gamescout_agent::{tool_schemas, HttpLlmClient, LlmClient, LlmError};
use gamescout_core::config::{AppConfig, LlmProvider};
use gamescout_core::domain::ChatMessage;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let address = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{address}")
}

#[tokio::test]
async fn ollama_dialect_posts_non_streaming_chat_with_tools() {
    let seen = Arc::new(Mutex::new(Value::Null));
    let captured = seen.clone();
    let router = Router::new().route(
        "/api/chat",
        post(move |Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                *captured.lock().await = body;
                Json(json!({
                    "model": "llama3.1:8b",
                    "message": {
                        "role": "assistant",
                        "content": "",
                        "tool_calls": [
                            {"function": {"name": "search_games", "arguments": {"query": "co-op"}}}
                        ]
                    }
                }))
            }
        }),
    );
    let mut config = AppConfig::default();
    config.llm.base_url = serve(router).await;
    let client = HttpLlmClient::from_config(&config.llm).expect("client builds");

    let completion = client
        .complete(&[ChatMessage::user("co-op games")], Some(tool_schemas()))
        .await
        .expect("completion");

    assert_eq!(completion.model, "llama3.1:8b");
    assert_eq!(completion.message.tool_calls[0].name, "search_games");
    let body = seen.lock().await.clone();
    assert_eq!(body["stream"], false);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["tools"][0]["function"]["name"], "search_games");
}

#[tokio::test]
async fn openai_dialect_sends_bearer_key() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap| async move {
            let authorized = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value == "Bearer sk-test");
            if !authorized {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "no key"})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "model": "gpt-4o-mini",
                    "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
                })),
            )
        }),
    );
    let mut config = AppConfig::default();
    config.llm.provider = LlmProvider::OpenAi;
    config.llm.base_url = serve(router).await;
    config.llm.api_key = Some("sk-test".to_string().into());
    let client = HttpLlmClient::from_config(&config.llm).expect("client builds");

    let completion = client.complete(&[ChatMessage::user("hi")], None).await.expect("completion");

    assert_eq!(completion.message.content, "Hello!");
    assert_eq!(completion.model, "gpt-4o-mini");
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let router = Router::new()
        .route("/api/chat", post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }));
    let mut config = AppConfig::default();
    config.llm.base_url = serve(router).await;
    let client = HttpLlmClient::from_config(&config.llm).expect("client builds");

    let error = client.complete(&[ChatMessage::user("hi")], None).await.expect_err("503");

    assert_eq!(error, LlmError::Status { status: 503, body: "model loading".to_string() });
}
