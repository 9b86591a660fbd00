//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own user database and a
//! scripted language model.

use super::constants::*;
use super::fixtures::{create_test_db_with_users, LlmReply, ScriptedLlmProvider};
use moodwave_server::llm::CompletionOptions;
use moodwave_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use moodwave_server::{Recommender, SqliteUserStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The model double, for asserting how often it was called
    pub llm: Arc<ScriptedLlmProvider>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port whose model always
    /// answers with `reply`.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound
    /// or the server does not become ready in time.
    pub async fn spawn(reply: LlmReply) -> Self {
        let (temp_db_dir, db_path) =
            create_test_db_with_users().expect("Failed to create test database");
        let user_store = SqliteUserStore::new(&db_path).expect("Failed to open user store");

        let llm = ScriptedLlmProvider::new(reply);
        let recommender = Recommender::new(llm.clone(), CompletionOptions::default());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: 60,
        };
        let app = make_app(config, Box::new(user_store), recommender).expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            llm,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Polls `/` until the server answers.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
