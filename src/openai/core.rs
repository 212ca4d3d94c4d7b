use std::time::Duration;

use anyhow::{Result, anyhow};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::AppConfig;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Delta {
    Content { content: String },

    Stop {},
}

#[derive(Debug, Deserialize)]
struct CompletionChunkChoice {
    #[allow(dead_code)]
    index: usize,
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[allow(dead_code)]
    id: String,
    #[allow(dead_code)]
    model: String,
    choices: Vec<CompletionChunkChoice>,
}

/// Submit a transcript for a streamed completion. Yields content
/// fragments in arrival order until the backend closes the stream or a
/// choice reports a finish reason. Dropping the returned stream aborts
/// the underlying request.
pub fn completion_stream(
    client: &reqwest::Client,
    config: &AppConfig,
    messages: &[Message],
) -> BoxStream<'static, Result<String>> {
    let client = client.clone();
    let payload = json!({
        "model": config.openai_model,
        "messages": messages,
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
        "stream": true,
    });
    let url = format!(
        "{}/chat/completions",
        config.openai_base_url.trim_end_matches('/')
    );
    let api_key = config.openai_api_key.clone();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(url)
            .bearer_auth(&api_key)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(60 * 10))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!("Completion request failed ({}): {}", status, body))?;
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            // Buffer raw bytes to handle SSE fragmentation over HTTP/2
            // frames. A transport chunk can end mid-character, so only
            // complete events are decoded; the event boundary is ASCII
            // and safe to find in raw bytes.
            buffer.extend_from_slice(&chunk);

            // Process all complete SSE events from the buffer
            while let Some(event_end) = buffer.windows(2).position(|w| w == b"\n\n") {
                let event: Vec<u8> = buffer.drain(..event_end + 2).collect();
                let event_data = std::str::from_utf8(&event[..event_end])?;

                // Skip empty events
                let event_data = event_data.trim();
                if event_data.is_empty() {
                    continue;
                }

                // Parse SSE events
                if !event_data.starts_with("data: ") {
                    continue;
                }

                // Extract the JSON payload (after "data: ")
                let data = event_data[6..].trim();

                // Data can sometimes be empty. Not sure why.
                if data.is_empty() {
                    continue;
                }

                // Handle the end of the stream
                if data == "[DONE]" {
                    break 'outer;
                }

                // Process the delta
                let chunk = serde_json::from_str::<CompletionChunk>(data).inspect_err(|e| {
                    tracing::error!("Parsing completion chunk failed for {}\nError:{}", data, e)
                })?;
                let Some(choice) = chunk.choices.first() else {
                    continue;
                };

                match &choice.delta {
                    Delta::Content { content } => {
                        if !content.is_empty() {
                            yield content.clone();
                        }
                        if choice.finish_reason.is_some() {
                            break 'outer;
                        }
                    }
                    Delta::Stop {} => {
                        if choice.finish_reason.is_some() {
                            break 'outer;
                        }
                    }
                }
            }
        }
    })
}
