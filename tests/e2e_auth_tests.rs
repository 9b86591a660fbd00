//! End-to-end tests for authentication endpoints
//!
//! Tests login, logout, session lookup and authentication requirements.

mod common;

use common::{recommendation_request, LlmReply, TestClient, TestServer, TEST_PASS, TEST_USER};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = TestServer::spawn(LlmReply::text("[]")).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_USER, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("Login should set the session cookie");
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().expect("Login should return a token");
    assert!(set_cookie.contains(token));
}

#[tokio::test]
async fn test_login_with_invalid_password() {
    let server = TestServer::spawn(LlmReply::text("[]")).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_USER, "wrong_password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_nonexistent_user() {
    let server = TestServer::spawn(LlmReply::text("[]")).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("nonexistent_user", "password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_reports_logged_in_user() {
    let server = TestServer::spawn(LlmReply::text("[]")).await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user_handle"], TEST_USER);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::spawn(LlmReply::text("[]")).await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_recommendations_require_authentication() {
    let server = TestServer::spawn(LlmReply::text("[]")).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .post_recommendations(&recommendation_request("mood", "Happy"))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(server.llm.calls(), 0);
}

#[tokio::test]
async fn test_home_is_public_and_echoes_session() {
    let server = TestServer::spawn(LlmReply::text("[]")).await;

    let anonymous = TestClient::new(server.base_url.clone());
    let response = anonymous.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["session_token"].is_null());

    let client = TestClient::authenticated(server.base_url.clone()).await;
    let body: Value = client.get_home().await.json().await.unwrap();
    assert!(body["session_token"].is_string());
}
