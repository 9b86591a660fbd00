use axum::extract::FromRef;

use crate::recommendation::Recommender;
use crate::user::UserManager;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<Mutex<UserManager>>;
pub type GuardedRecommender = Arc<Recommender>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_manager: GuardedUserManager,
    pub recommender: GuardedRecommender,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, user_manager: UserManager, recommender: Recommender) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            user_manager: Arc::new(Mutex::new(user_manager)),
            recommender: Arc::new(recommender),
            hash: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedRecommender {
    fn from_ref(input: &ServerState) -> Self {
        input.recommender.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
