//! Test fixtures: the seeded user database and a scripted language model.

use super::constants::*;
use anyhow::Result;
use async_trait::async_trait;
use moodwave_server::llm::{CompletionOptions, CompletionResponse, LlmError, LlmProvider, Message};
use moodwave_server::{SqliteUserStore, UserManager};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Creates a temporary user database holding the test user.
/// Returns (temp_dir, db_path)
pub fn create_test_db_with_users() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("user.db");

    let user_manager = UserManager::new(Box::new(SqliteUserStore::new(&db_path)?));
    user_manager.add_user(TEST_USER)?;
    user_manager.create_password_credentials(TEST_USER, TEST_PASS)?;

    Ok((dir, db_path))
}

/// What the scripted model answers to every completion.
#[derive(Debug, Clone)]
pub enum LlmReply {
    Text(String),
    Fail,
}

impl LlmReply {
    pub fn text(text: impl Into<String>) -> Self {
        LlmReply::Text(text.into())
    }
}

/// Language model double that answers with a fixed reply and counts calls.
pub struct ScriptedLlmProvider {
    reply: LlmReply,
    calls: AtomicUsize,
}

impl ScriptedLlmProvider {
    pub fn new(reply: LlmReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlmProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            LlmReply::Text(text) => Ok(CompletionResponse::text(text.clone())),
            LlmReply::Fail => Err(LlmError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            }),
        }
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}

/// The songs sent with recommendation requests, one per entry of [`SONG_IDS`].
pub fn test_songs() -> Value {
    Value::Array(
        SONG_IDS
            .iter()
            .enumerate()
            .map(|(i, id)| {
                json!({
                    "id": id,
                    "title": format!("Song {}", i + 1),
                    "artist": "Test Artist",
                })
            })
            .collect(),
    )
}

pub fn recommendation_request(category: &str, option: &str) -> Value {
    json!({
        "category": category,
        "option": option,
        "songs": test_songs(),
    })
}
