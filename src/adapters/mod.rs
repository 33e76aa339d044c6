//! Adapter interfaces for hosted language models.
//!
//! Everything that talks to a model goes through [`CompletionClient`], so
//! stages can be driven by the HTTP client in production and by scripted
//! doubles in tests.

pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::Settings;

pub use openai::ChatCompletionsClient;

/// A single system+user exchange sent to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Instruction framing the model's role
    pub system_message: String,

    /// Prompt body
    pub user_message: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Model parameters shared by every request of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelParams {
    /// Build a request with these parameters
    pub fn request(
        &self,
        system_message: impl Into<String>,
        user_message: impl Into<String>,
    ) -> CompletionRequest {
        CompletionRequest {
            system_message: system_message.into(),
            user_message: user_message.into(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl From<&Settings> for ModelParams {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Errors surfaced by a completion call
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Trait for model backends
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Send one request and return the raw completion text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
