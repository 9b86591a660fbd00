//! AI-assisted song recommendations.
//!
//! A request flows through [`build_prompt`], an [`LlmProvider`](crate::llm::LlmProvider)
//! completion, [`extract_raw_recommendations`] and [`map_recommendations`].
//! [`Recommender`] ties the steps together.

mod categories;
mod extractor;
mod mapper;
mod models;
mod prompt;
mod service;

pub use categories::{category_catalog, CategoryDescriptor, RecommendationCategory};
pub use extractor::{extract_raw_recommendations, ExtractionError};
pub use mapper::map_recommendations;
pub use models::{
    RawRecommendation, Recommendation, RecommendationRequest, RecommendationsResponse, Song,
};
pub use prompt::{build_prompt, REQUESTED_RECOMMENDATIONS};
pub use service::{RecommendationError, RecommendationStage, Recommender};
