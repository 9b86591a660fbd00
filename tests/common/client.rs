//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint. When routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as the test user
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(TEST_USER, TEST_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Test user authentication failed: {:?}",
            response.text().await
        );

        client
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /auth/login
    pub async fn login(&self, handle: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({
                "user_handle": handle,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// GET /auth/session
    pub async fn get_session(&self) -> Response {
        self.client
            .get(format!("{}/auth/session", self.base_url))
            .send()
            .await
            .expect("Session request failed")
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // AI Endpoints
    // ========================================================================

    /// POST /ai/recommendations
    pub async fn post_recommendations(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/ai/recommendations", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Recommendations request failed")
    }

    /// POST /ai/recommendations with an arbitrary body
    pub async fn post_recommendations_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/ai/recommendations", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Recommendations request failed")
    }

    /// GET /ai/categories
    pub async fn get_categories(&self) -> Response {
        self.client
            .get(format!("{}/ai/categories", self.base_url))
            .send()
            .await
            .expect("Categories request failed")
    }
}
