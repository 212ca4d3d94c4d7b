//! Test utilities for integration tests
use std::sync::Arc;

use axum::Router;
use axum::body::Body;

use subscript::api::{AppState, app};
use subscript::core::AppConfig;

/// Creates a test application router pointed at a mock completion
/// backend.
pub fn test_app(backend_url: &str) -> Router {
    let config = AppConfig {
        openai_api_key: String::from("test-api-key"),
        openai_base_url: backend_url.to_string(),
        openai_model: String::from("qwen-turbo-latest"),
        temperature: 0.6,
        max_tokens: 64,
        max_rounds: 3,
        system_prompt: String::from("You are a transcript assistant."),
    };
    app(Arc::new(AppState::new(config)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body was not valid UTF-8")
}

/// An SSE completion response carrying one content fragment per event.
pub fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        let chunk = serde_json::json!({
            "id": format!("chunk{}", i),
            "model": "qwen-turbo-latest",
            "choices": [{
                "index": 0,
                "delta": {"content": fragment},
                "finish_reason": null,
            }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}
