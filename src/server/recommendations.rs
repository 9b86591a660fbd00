//! `/ai` routes: recommendation generation and the category catalog.

use super::session::Session;
use super::state::{GuardedRecommender, ServerState};
use super::http_cache;
use crate::recommendation::{
    category_catalog, RecommendationError, RecommendationRequest, RecommendationStage,
    RecommendationsResponse,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::debug;

const INVALID_REQUEST_MESSAGE: &str = "Invalid request parameters";
const GENERATION_FAILED_MESSAGE: &str = "Error generating recommendations";
const PROCESSING_FAILED_MESSAGE: &str = "Error processing AI recommendations";

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

fn error_response(status: StatusCode, message: &'static str) -> Response {
    (status, Json(ErrorBody { message })).into_response()
}

/// Clients get a fixed message per failure class; provider details stay in
/// the logs.
impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        match self {
            RecommendationError::Validation(_) => {
                error_response(StatusCode::BAD_REQUEST, INVALID_REQUEST_MESSAGE)
            }
            RecommendationError::ModelCommunication(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED_MESSAGE)
            }
            RecommendationError::MalformedModelOutput(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED_MESSAGE)
            }
        }
    }
}

async fn post_recommendations(
    session: Session,
    State(recommender): State<GuardedRecommender>,
    body: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(
                stage = %RecommendationStage::Validating,
                user_id = session.user_id,
                "Rejected recommendation body: {}",
                rejection.body_text()
            );
            return error_response(StatusCode::BAD_REQUEST, INVALID_REQUEST_MESSAGE);
        }
    };

    match recommender.recommend(&request).await {
        Ok(recommendations) => {
            debug!(
                stage = %RecommendationStage::Responding,
                user_id = session.user_id,
                count = recommendations.len(),
                "Sending recommendations"
            );
            Json(RecommendationsResponse { recommendations }).into_response()
        }
        Err(err) => err.into_response(),
    }
}

async fn get_categories() -> impl IntoResponse {
    Json(category_catalog())
}

pub fn make_recommendation_routes(state: ServerState) -> Router {
    let catalog_routes: Router = Router::new()
        .route("/categories", get(get_categories))
        .layer(middleware::from_fn_with_state(
            state.config.content_cache_age_sec,
            http_cache,
        ));

    Router::new()
        .route("/recommendations", post(post_recommendations))
        .with_state(state)
        .merge(catalog_routes)
}
