//! LLM provider trait definition.

use super::types::{CompletionResponse, Message};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options for a completion request.
///
/// Every field is optional: unset values leave the provider (or its HTTP
/// client) defaults in place.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timeout")]
    Timeout,

    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),
}

/// Trait for LLM providers.
///
/// Implementations of this trait can connect to different LLM backends
/// while providing a unified interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider's name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Complete a conversation and return the model's single reply.
    ///
    /// # Arguments
    /// * `messages` - The conversation history.
    /// * `options` - Completion options (temperature, timeout, etc.).
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;

    /// Check if the provider is healthy and reachable.
    async fn health_check(&self) -> Result<(), LlmError>;
}
