//! LLM provider abstraction layer.
//!
//! This module provides a trait-based abstraction for text-completion
//! providers, so the recommendation flow can run against Gemini or a test
//! double.

mod api_key;
mod factory;
mod gemini;
mod provider;
mod types;

pub use api_key::ApiKeySource;
pub use factory::create_llm_provider;
pub use gemini::{GeminiProvider, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};

/// Maps a reqwest transport error into an [`LlmError`].
pub(crate) fn transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Connection(e.to_string())
    }
}
