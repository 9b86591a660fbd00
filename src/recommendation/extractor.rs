//! Pulls the JSON array out of the model's free-form reply.

use super::models::RawRecommendation;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No JSON array found in model output")]
    NoJsonArray,

    #[error("Model output is not a valid JSON array: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Returns the slice from the first `[` to the last `]` after it.
///
/// This is a greedy scan, not bracket matching: prose between two arrays
/// ends up in the slice and makes the parse fail.
fn find_array_slice(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parses the raw recommendations embedded in `text`.
///
/// Elements are not validated here; a non-object element or a missing
/// field gives a [`RawRecommendation`] with the field absent.
pub fn extract_raw_recommendations(text: &str) -> Result<Vec<RawRecommendation>, ExtractionError> {
    let slice = find_array_slice(text).ok_or(ExtractionError::NoJsonArray)?;
    let elements: Vec<Value> = serde_json::from_str(slice)?;
    Ok(elements.iter().map(raw_from_value).collect())
}

fn raw_from_value(value: &Value) -> RawRecommendation {
    let song_id = match value.get("songId") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let reason = match value.get("reason") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    RawRecommendation { song_id, reason }
}
