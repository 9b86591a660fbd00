//! What the recommendation panel shows for a given state.

use super::library::Library;
use super::store::RecommendationState;
use crate::cli_style;

pub const LOADING_MESSAGE: &str = "Analyzing your preferences...";
pub const RESULTS_SUBTITLE: &str = "Based on your listening patterns and preferences";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendedItem {
    pub song_id: String,
    pub title: String,
    pub artist: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultList {
    pub heading: String,
    pub items: Vec<RecommendedItem>,
    pub try_another_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationView {
    pub category_label: &'static str,
    /// Present when idle with nothing to show.
    pub options: Option<Vec<&'static str>>,
    pub loading: bool,
    pub error: Option<String>,
    pub results: Option<ResultList>,
}

pub fn build_view(state: &RecommendationState, library: &Library) -> RecommendationView {
    let category_label = state.category.label();
    let idle_and_empty = state.recommendations.is_empty() && !state.is_loading;

    let results = state.recommendations.first().map(|first| ResultList {
        heading: format!("Recommended for {}: {}", category_label, first.reason),
        items: state
            .recommendations
            .iter()
            .filter_map(|rec| {
                library.find(&rec.song_id).map(|song| RecommendedItem {
                    song_id: song.id.clone(),
                    title: song.title.clone(),
                    artist: song.artist.clone(),
                    reason: rec.reason.clone(),
                })
            })
            .collect(),
        try_another_label: format!("Try another {}", state.category.id()),
    });

    RecommendationView {
        category_label,
        options: idle_and_empty.then(|| state.category.options().to_vec()),
        loading: state.is_loading,
        error: state.error.clone(),
        results,
    }
}

pub fn print_view(view: &RecommendationView) {
    cli_style::print_section_header(&format!("AI Recommendations · {}", view.category_label));

    if let Some(error) = &view.error {
        cli_style::print_error(error);
        cli_style::print_info("Type 'dismiss' to clear this message, or pick an option to try again.");
    }

    if view.loading {
        cli_style::print_info(LOADING_MESSAGE);
    }

    if let Some(options) = &view.options {
        for (i, option) in options.iter().enumerate() {
            cli_style::print_list_item(&format!("{}. {}", i + 1, option), 1);
        }
    }

    if let Some(results) = &view.results {
        cli_style::print_heading(&results.heading);
        cli_style::print_subtitle(RESULTS_SUBTITLE);
        println!();
        if results.items.is_empty() {
            cli_style::print_empty_list("None of the recommended songs are in your library");
        }
        for (i, item) in results.items.iter().enumerate() {
            cli_style::print_track(
                i + 1,
                &item.title,
                &item.artist,
                Some(item.reason.as_str()),
            );
        }
        println!();
        cli_style::print_list_item(&format!("'again': {}", results.try_another_label), 1);
        cli_style::print_list_item("'play': Play all", 1);
    }

    cli_style::print_section_footer();
}
