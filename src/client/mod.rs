//! Client side of the recommendation flow: API access, state and rendering.

mod api;
mod library;
mod store;
mod view;

#[cfg(feature = "mock")]
pub use api::MockRecommendationsApi;
pub use api::{ApiError, HttpRecommendationsApi, RecommendationsApi};
pub use library::{Library, LibrarySong};
pub use store::{
    FetchTicket, RecommendationController, RecommendationState, RecommendationStore,
    RECOMMENDATION_ERROR_MESSAGE,
};
pub use view::{
    build_view, print_view, RecommendationView, RecommendedItem, ResultList, LOADING_MESSAGE,
    RESULTS_SUBTITLE,
};
