//! Tests for the client-side recommendation controller
//!
//! The API is replaced with in-process doubles so completion order can be
//! controlled.

use async_trait::async_trait;
use moodwave_server::client::{
    ApiError, Library, LibrarySong, RecommendationController, RecommendationStore,
    RecommendationsApi, RECOMMENDATION_ERROR_MESSAGE,
};
use moodwave_server::recommendation::{
    category_catalog, CategoryDescriptor, Recommendation, RecommendationCategory,
    RecommendationRequest,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

fn rec(id: &str, reason: &str) -> Recommendation {
    Recommendation {
        song_id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn library() -> Library {
    Library::new(
        ["one", "two", "three"]
            .iter()
            .map(|id| LibrarySong {
                id: id.to_string(),
                title: format!("Title {}", id),
                artist: "Artist".to_string(),
                image_url: String::new(),
                audio_url: format!("https://example.invalid/{}.mp3", id),
                duration_secs: 180,
            })
            .collect(),
    )
}

/// Answers every request with the recommendations registered for its
/// option. Requests for a gated option wait until the gate is opened.
#[derive(Default)]
struct FakeApi {
    replies: Mutex<Vec<(String, Result<Vec<Recommendation>, ()>)>>,
    gated_option: Mutex<Option<String>>,
    gate: Notify,
    requests: Mutex<Vec<RecommendationRequest>>,
}

impl FakeApi {
    fn reply(self, option: &str, result: Result<Vec<Recommendation>, ()>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push((option.to_string(), result));
        self
    }

    fn gate(self, option: &str) -> Self {
        *self.gated_option.lock().unwrap() = Some(option.to_string());
        self
    }

    fn requests(&self) -> Vec<RecommendationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationsApi for FakeApi {
    async fn fetch_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Recommendation>, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        let gated = self.gated_option.lock().unwrap().as_deref() == Some(request.option.as_str());
        if gated {
            self.gate.notified().await;
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .find(|(option, _)| option == &request.option)
            .map(|(_, result)| result.clone());
        match reply {
            Some(Ok(recommendations)) => Ok(recommendations),
            _ => Err(ApiError::Status {
                status: 500,
                message: "Error generating recommendations".to_string(),
            }),
        }
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryDescriptor>, ApiError> {
        Ok(category_catalog())
    }
}

fn controller(api: Arc<FakeApi>) -> Arc<RecommendationController> {
    Arc::new(RecommendationController::new(
        Arc::new(RecommendationStore::new()),
        api,
        library(),
    ))
}

async fn wait_until_loading(controller: &RecommendationController) {
    for _ in 0..200 {
        if controller.store().snapshot().is_loading {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("fetch never started");
}

#[tokio::test]
async fn test_select_option_sends_library_and_stores_result() {
    let api = Arc::new(FakeApi::default().reply("Happy", Ok(vec![rec("two", "bouncy")])));
    let controller = controller(api.clone());

    assert!(controller.select_option("Happy").await);

    let state = controller.store().snapshot();
    assert!(!state.is_loading);
    assert_eq!(state.recommendations, vec![rec("two", "bouncy")]);
    assert_eq!(state.selected_option.as_deref(), Some("Happy"));

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].category, "mood");
    assert_eq!(requests[0].option, "Happy");
    let ids: Vec<_> = requests[0].songs.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_failure_shows_generic_error() {
    let api = Arc::new(FakeApi::default().reply("Sad", Err(())));
    let controller = controller(api);

    controller.select_category(RecommendationCategory::Mood);
    controller.select_option("Sad").await;

    let state = controller.store().snapshot();
    assert_eq!(state.error.as_deref(), Some(RECOMMENDATION_ERROR_MESSAGE));
    assert!(state.recommendations.is_empty());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_category_switch_discards_late_completion() {
    let api = Arc::new(
        FakeApi::default()
            .reply("Happy", Ok(vec![rec("one", "late")]))
            .gate("Happy"),
    );
    let controller = controller(api.clone());

    let in_flight = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.select_option("Happy").await })
    };
    wait_until_loading(&controller).await;

    controller.select_category(RecommendationCategory::Activity);
    api.gate.notify_one();

    assert!(!in_flight.await.unwrap());
    let state = controller.store().snapshot();
    assert_eq!(state.category, RecommendationCategory::Activity);
    assert!(state.recommendations.is_empty());
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_newer_selection_wins() {
    let api = Arc::new(
        FakeApi::default()
            .reply("Happy", Ok(vec![rec("one", "old")]))
            .reply("Relaxed", Ok(vec![rec("three", "new")]))
            .gate("Happy"),
    );
    let controller = controller(api.clone());

    let older = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.select_option("Happy").await })
    };
    wait_until_loading(&controller).await;

    assert!(controller.select_option("Relaxed").await);
    api.gate.notify_one();
    assert!(!older.await.unwrap());

    let state = controller.store().snapshot();
    assert_eq!(state.selected_option.as_deref(), Some("Relaxed"));
    assert_eq!(state.recommendations, vec![rec("three", "new")]);
}

#[tokio::test]
async fn test_play_all_resolves_known_songs_in_order() {
    let api = Arc::new(FakeApi::default().reply(
        "Party",
        Ok(vec![rec("three", "a"), rec("ghost", "b"), rec("one", "c")]),
    ));
    let controller = controller(api);

    controller.select_category(RecommendationCategory::Activity);
    controller.select_option("Party").await;

    let queue: Vec<_> = controller
        .play_all()
        .into_iter()
        .map(|song| song.id)
        .collect();
    assert_eq!(queue, vec!["three", "one"]);
}

#[cfg(feature = "mock")]
#[tokio::test]
async fn test_controller_with_mocked_api() {
    use moodwave_server::client::MockRecommendationsApi;

    let mut api = MockRecommendationsApi::new();
    api.expect_fetch_recommendations()
        .withf(|request| request.category == "time" && request.option == "Night")
        .times(1)
        .returning(|_| Ok(vec![rec("one", "quiet")]));

    let controller = RecommendationController::new(
        Arc::new(RecommendationStore::new()),
        Arc::new(api),
        library(),
    );
    controller.select_category(RecommendationCategory::Time);
    assert!(controller.select_option("Night").await);
    assert_eq!(
        controller.store().snapshot().recommendations,
        vec![rec("one", "quiet")]
    );
}
