//! Orchestrates one recommendation request: prompt, completion, extraction
//! and mapping.

use super::extractor::{extract_raw_recommendations, ExtractionError};
use super::mapper::map_recommendations;
use super::models::{Recommendation, RecommendationRequest};
use super::prompt::build_prompt;
use crate::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use crate::server::metrics;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Where a recommendation request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationStage {
    Validating,
    Generating,
    Extracting,
    Mapping,
    Responding,
}

impl RecommendationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStage::Validating => "validating",
            RecommendationStage::Generating => "generating",
            RecommendationStage::Extracting => "extracting",
            RecommendationStage::Mapping => "mapping",
            RecommendationStage::Responding => "responding",
        }
    }
}

impl fmt::Display for RecommendationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Model communication failed: {0}")]
    ModelCommunication(#[from] LlmError),

    #[error("Malformed model output: {0}")]
    MalformedModelOutput(#[from] ExtractionError),
}

impl RecommendationError {
    /// The stage the request failed in.
    pub fn stage(&self) -> RecommendationStage {
        match self {
            RecommendationError::Validation(_) => RecommendationStage::Validating,
            RecommendationError::ModelCommunication(_) => RecommendationStage::Generating,
            RecommendationError::MalformedModelOutput(_) => RecommendationStage::Extracting,
        }
    }

    /// Label used for the outcome metric.
    pub fn kind(&self) -> &'static str {
        match self {
            RecommendationError::Validation(_) => "invalid_request",
            RecommendationError::ModelCommunication(_) => "model_error",
            RecommendationError::MalformedModelOutput(_) => "malformed_output",
        }
    }
}

/// Produces recommendations for a request using the configured provider.
pub struct Recommender {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl Recommender {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let result = self.run(request).await;
        match &result {
            Ok(_) => metrics::record_recommendation("success"),
            Err(e) => metrics::record_recommendation(e.kind()),
        }
        result
    }

    async fn run(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        if let Some(field) = request.first_invalid_field() {
            return Err(RecommendationError::Validation(format!(
                "missing or blank {}",
                field
            )));
        }

        debug!(
            stage = %RecommendationStage::Generating,
            provider = self.provider.name(),
            model = self.provider.model(),
            song_count = request.songs.len(),
            "Requesting recommendations"
        );
        let prompt = build_prompt(&request.category, &request.option, &request.songs);
        let text = self.generate(prompt).await?;

        debug!(stage = %RecommendationStage::Extracting, "Extracting recommendations");
        let raw = match extract_raw_recommendations(&text) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    stage = %RecommendationStage::Extracting,
                    error = %e,
                    raw_text = %text,
                    "Could not extract recommendations from model output"
                );
                return Err(e.into());
            }
        };

        let raw_count = raw.len();
        let recommendations = map_recommendations(raw, &request.songs);
        metrics::record_dropped_references(raw_count - recommendations.len());

        debug!(
            stage = %RecommendationStage::Mapping,
            raw_count,
            mapped_count = recommendations.len(),
            "Mapped recommendations"
        );

        Ok(recommendations)
    }

    async fn generate(&self, prompt: String) -> Result<String, LlmError> {
        let start = Instant::now();
        let result = self
            .provider
            .complete(&[Message::user(prompt)], &self.options)
            .await;

        metrics::record_llm_completion(
            self.provider.name(),
            if result.is_ok() { "success" } else { "error" },
            start.elapsed(),
        );

        match result {
            Ok(response) => Ok(response.message.content),
            Err(e) => {
                error!(
                    stage = %RecommendationStage::Generating,
                    provider = self.provider.name(),
                    model = self.provider.model(),
                    error = %e,
                    "Recommendation generation failed"
                );
                Err(e)
            }
        }
    }
}
