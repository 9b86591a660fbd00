//! HTTP access to the recommendation endpoints.

use crate::recommendation::{
    CategoryDescriptor, Recommendation, RecommendationRequest, RecommendationsResponse,
};
use crate::server::HEADER_SESSION_TOKEN_KEY;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not logged in")]
    Unauthenticated,

    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait RecommendationsApi: Send + Sync {
    async fn fetch_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, ApiError>;

    async fn fetch_categories(&self) -> Result<Vec<CategoryDescriptor>, ApiError>;
}

/// Talks to a running server. Sessions are carried in the `Authorization`
/// header once [`login`](HttpRecommendationsApi::login) succeeded.
pub struct HttpRecommendationsApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRecommendationsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn login(&mut self, user_handle: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({ "user_handle": user_handle, "password": password }))
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                let body: LoginResponse = response.json().await?;
                self.token = Some(body.token);
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthenticated),
            status => Err(ApiError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let Some(token) = self.token.take() else {
            return Ok(());
        };
        self.client
            .get(format!("{}/auth/logout", self.base_url))
            .header(HEADER_SESSION_TOKEN_KEY, token)
            .send()
            .await?;
        Ok(())
    }

    async fn into_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return ApiError::Unauthenticated;
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
        };
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl RecommendationsApi for HttpRecommendationsApi {
    async fn fetch_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthenticated)?;
        debug!(
            category = %request.category,
            option = %request.option,
            song_count = request.songs.len(),
            "Fetching recommendations"
        );

        let response = self
            .client
            .post(format!("{}/ai/recommendations", self.base_url))
            .header(HEADER_SESSION_TOKEN_KEY, token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        let body: RecommendationsResponse = response.json().await?;
        Ok(body.recommendations)
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryDescriptor>, ApiError> {
        let response = self
            .client
            .get(format!("{}/ai/categories", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::into_error(response).await);
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requires_login_before_fetching() {
        let api = HttpRecommendationsApi::new("http://127.0.0.1:1/");
        let request = RecommendationRequest {
            category: "mood".into(),
            option: "Happy".into(),
            songs: vec![],
        };
        assert!(matches!(
            api.fetch_recommendations(&request).await,
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn trims_trailing_slash() {
        let api = HttpRecommendationsApi::new("http://localhost:3001/").with_token("abc");
        assert_eq!(api.base_url, "http://localhost:3001");
        assert_eq!(api.token(), Some("abc"));
    }
}
