//! Common test infrastructure
//!
//! This module provides everything the end-to-end tests need: an isolated
//! server with a scripted language model, and an HTTP client that keeps the
//! session cookie.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{LlmReply, TestClient, TestServer};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_categories() {
//!     let server = TestServer::spawn(LlmReply::text("[]")).await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_categories().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{recommendation_request, test_songs, LlmReply, ScriptedLlmProvider};
pub use server::TestServer;
