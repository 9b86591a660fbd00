//! Moodwave Server Library
//!
//! This library exposes the internal modules for testing and reuse by the
//! bundled binaries (server, cli-auth, cli-recommend).

pub mod cli_style;
pub mod client;
pub mod config;
pub mod llm;
pub mod recommendation;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use llm::{LlmError, LlmProvider};
pub use recommendation::{Recommendation, RecommendationError, Recommender, Song};
pub use server::{run_server, RequestsLoggingLevel};
pub use user::{SqliteUserStore, UserManager, UserStore};
