//! Chat-completions adapter.
//!
//! Speaks the OpenAI-compatible `POST /v1/chat/completions` protocol with
//! Bearer auth. One request per call, no retries.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::Settings;

/// HTTP client for a chat-completions endpoint
pub struct ChatCompletionsClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Create a client from resolved settings.
    ///
    /// Fails with `Auth` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, CompletionError> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            CompletionError::Auth(
                "API key not provided. Set LLM_API_KEY in your .env file or pass --api-key"
                    .to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            api_key,
            client,
        })
    }

    /// Create a client with explicit endpoint and key
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

/// Map a non-success status to the error kind callers see
fn classify_status(status: StatusCode, body: &str) -> CompletionError {
    let detail = format!("HTTP {}: {}", status, body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimit(detail),
        _ => CompletionError::Transport(detail),
    }
}

/// Pull the first choice's content out of a response body
fn parse_content(body: &str) -> Result<String, CompletionError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            CompletionError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}

#[async_trait]
impl CompletionClient for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_message,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        info!(model = %request.model, "Calling LLM API");
        let started = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let content = parse_content(&text)?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = content.len(),
            "API call completed"
        );
        debug!(preview = %content.chars().take(80).collect::<String>(), "Completion received");

        Ok(content)
    }
}
