//! Client-side recommendation state.
//!
//! Every fetch is tagged with the generation it was started under. Selecting
//! a new option or switching category bumps the generation, so a completion
//! that arrives late is dropped instead of overwriting newer state.

use super::api::{ApiError, RecommendationsApi};
use super::library::{Library, LibrarySong};
use crate::recommendation::{Recommendation, RecommendationCategory, RecommendationRequest};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

pub const RECOMMENDATION_ERROR_MESSAGE: &str =
    "Failed to get AI recommendations. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationState {
    pub category: RecommendationCategory,
    pub selected_option: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub recommendations: Vec<Recommendation>,
    pub generation: u64,
}

/// Handed out when a fetch starts; completing with a stale ticket is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub category: RecommendationCategory,
    pub option: String,
}

#[derive(Debug, Default)]
pub struct RecommendationStore {
    state: Mutex<RecommendationState>,
}

impl RecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RecommendationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> RecommendationState {
        self.lock().clone()
    }

    /// Switches category, clearing results and abandoning any fetch in flight.
    pub fn select_category(&self, category: RecommendationCategory) {
        let mut state = self.lock();
        state.category = category;
        state.selected_option = None;
        state.recommendations.clear();
        state.is_loading = false;
        state.generation += 1;
    }

    pub fn begin_fetch(&self, option: &str) -> FetchTicket {
        let mut state = self.lock();
        state.generation += 1;
        state.selected_option = Some(option.to_string());
        state.is_loading = true;
        state.error = None;
        FetchTicket {
            generation: state.generation,
            category: state.category,
            option: option.to_string(),
        }
    }

    /// Applies a fetch result. Returns false when the ticket was superseded.
    pub fn complete_fetch(
        &self,
        ticket: &FetchTicket,
        result: Result<Vec<Recommendation>, ApiError>,
    ) -> bool {
        let mut state = self.lock();
        if ticket.generation != state.generation {
            debug!(
                ticket = ticket.generation,
                current = state.generation,
                "Discarding stale recommendations"
            );
            return false;
        }

        state.is_loading = false;
        match result {
            Ok(recommendations) => {
                state.recommendations = recommendations;
                state.error = None;
            }
            Err(err) => {
                warn!("Recommendation fetch failed: {}", err);
                state.recommendations.clear();
                state.error = Some(RECOMMENDATION_ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    /// Back to the option picker for the current category.
    pub fn try_another(&self) {
        let mut state = self.lock();
        state.recommendations.clear();
        state.selected_option = None;
    }
}

/// Drives a [`RecommendationStore`] against an API and a song library.
pub struct RecommendationController {
    store: Arc<RecommendationStore>,
    api: Arc<dyn RecommendationsApi>,
    library: Library,
}

impl RecommendationController {
    pub fn new(
        store: Arc<RecommendationStore>,
        api: Arc<dyn RecommendationsApi>,
        library: Library,
    ) -> Self {
        Self {
            store,
            api,
            library,
        }
    }

    pub fn store(&self) -> &Arc<RecommendationStore> {
        &self.store
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn select_category(&self, category: RecommendationCategory) {
        self.store.select_category(category);
    }

    /// Fetches recommendations for `option` in the current category. Returns
    /// whether the result was applied.
    pub async fn select_option(&self, option: &str) -> bool {
        let ticket = self.store.begin_fetch(option);
        let request = RecommendationRequest {
            category: ticket.category.id().to_string(),
            option: ticket.option.clone(),
            songs: self.library.request_songs(),
        };
        let result = self.api.fetch_recommendations(&request).await;
        self.store.complete_fetch(&ticket, result)
    }

    /// Library songs for the current recommendations, in order.
    pub fn play_all(&self) -> Vec<LibrarySong> {
        let state = self.store.snapshot();
        self.library.resolve_queue(&state.recommendations)
    }
}
