//! The fixed set of recommendation categories and their options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    #[default]
    Mood,
    Time,
    Activity,
}

const MOOD_OPTIONS: &[&str] = &[
    "Happy",
    "Sad",
    "Energetic",
    "Relaxed",
    "Focused",
    "Romantic",
    "Nostalgic",
    "Inspired",
];

const TIME_OPTIONS: &[&str] = &[
    "Morning",
    "Afternoon",
    "Evening",
    "Night",
    "Sunrise",
    "Sunset",
    "Midnight",
];

const ACTIVITY_OPTIONS: &[&str] = &[
    "Working",
    "Exercise",
    "Studying",
    "Party",
    "Sleep",
    "Meditation",
    "Cooking",
    "Driving",
];

impl RecommendationCategory {
    pub const ALL: [RecommendationCategory; 3] = [
        RecommendationCategory::Mood,
        RecommendationCategory::Time,
        RecommendationCategory::Activity,
    ];

    /// Identifier used on the wire and in the prompt.
    pub fn id(&self) -> &'static str {
        match self {
            RecommendationCategory::Mood => "mood",
            RecommendationCategory::Time => "time",
            RecommendationCategory::Activity => "activity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecommendationCategory::Mood => "Mood",
            RecommendationCategory::Time => "Time of Day",
            RecommendationCategory::Activity => "Activity",
        }
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self {
            RecommendationCategory::Mood => MOOD_OPTIONS,
            RecommendationCategory::Time => TIME_OPTIONS,
            RecommendationCategory::Activity => ACTIVITY_OPTIONS,
        }
    }

    pub fn descriptor(&self) -> CategoryDescriptor {
        CategoryDescriptor {
            id: self.id().to_string(),
            label: self.label().to_string(),
            options: self.options().iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RecommendationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Serializable description of a category, as served by `GET /ai/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    pub id: String,
    pub label: String,
    pub options: Vec<String>,
}

pub fn category_catalog() -> Vec<CategoryDescriptor> {
    RecommendationCategory::ALL
        .iter()
        .map(|c| c.descriptor())
        .collect()
}
