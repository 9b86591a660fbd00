use serde::{Deserialize, Serialize};

/// A song as supplied by the caller. Only the fields the prompt needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
}

impl Song {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// Body of `POST /ai/recommendations`.
///
/// The position of each song in `songs` (1-based) is what the model refers
/// to, so the order matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub category: String,
    pub option: String,
    pub songs: Vec<Song>,
}

impl RecommendationRequest {
    /// Checks the fields the request cannot be processed without.
    /// Returns the name of the first offending field.
    pub fn first_invalid_field(&self) -> Option<&'static str> {
        if self.category.trim().is_empty() {
            Some("category")
        } else if self.option.trim().is_empty() {
            Some("option")
        } else {
            None
        }
    }
}

/// One entry of the model's reply, before any checks.
///
/// `song_id` is whatever the model put there, normalized to text: `None`
/// when the field was missing or not a string/integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecommendation {
    pub song_id: Option<String>,
    pub reason: String,
}

/// A recommendation pointing at one of the caller's songs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "songId")]
    pub song_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}
