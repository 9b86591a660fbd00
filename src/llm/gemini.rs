//! Google Gemini provider implementation.
//!
//! Uses the `models/{model}:generateContent` endpoint of the Generative
//! Language API. The API key is sent in the `x-goog-api-key` header.

use super::api_key::ApiKeySource;
use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::transport_error;
use super::types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini LLM provider.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key_source: ApiKeySource,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://generativelanguage.googleapis.com/v1beta").
    /// * `model` - Model to use (e.g., "gemini-1.5-flash").
    /// * `api_key_source` - Where to read the API key from before each request.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_source: ApiKeySource,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key_source,
        }
    }

    async fn require_key(&self) -> Result<String, LlmError> {
        self.api_key_source
            .get_key()
            .await?
            .ok_or_else(|| LlmError::MissingApiKey(self.name().to_string()))
    }

    /// Splits our messages into Gemini's system instruction and contents.
    fn to_gemini_request(messages: &[Message], options: &CompletionOptions) -> GeminiRequest {
        let system_parts: Vec<GeminiPart> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| GeminiPart {
                text: m.content.clone(),
            })
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        MessageRole::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        let generation_config = if options.temperature.is_some() || options.max_tokens.is_some() {
            Some(GeminiGenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents,
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(GeminiContent {
                    role: None,
                    parts: system_parts,
                })
            },
            generation_config,
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = Self::to_gemini_request(messages, options);
        let api_key = self.require_key().await?;

        debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending generateContent request to Gemini"
        );

        let mut req_builder = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request);
        if let Some(timeout) = options.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse Gemini response: {}", e))
        })?;

        let completion = gemini_response.into_completion()?;

        debug!(
            finish_reason = ?completion.finish_reason,
            "Received generateContent response from Gemini"
        );

        Ok(completion)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let api_key = self.require_key().await?;

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(LlmError::Api {
                status: response.status().as_u16(),
                message: "Health check failed".to_string(),
            });
        }

        Ok(())
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    fn into_completion(self) -> Result<CompletionResponse, LlmError> {
        let usage = self.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        // The first candidate is the completion; there is no candidate at all
        // when the prompt itself was blocked.
        let candidate = match self.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = self
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "no candidates".to_string());
                return Err(LlmError::InvalidResponse(format!(
                    "Gemini returned no completion: {}",
                    reason
                )));
            }
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => FinishReason::MaxTokens,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => FinishReason::Blocked,
            _ => FinishReason::Stop,
        };

        Ok(CompletionResponse {
            message: Message::assistant(text),
            finish_reason,
            usage,
        })
    }
}
