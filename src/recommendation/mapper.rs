use super::models::{RawRecommendation, Recommendation, Song};
use tracing::debug;

/// Resolves a model-supplied `songId` to an index into `songs`.
///
/// The position is the leading run of decimal digits after optional
/// whitespace and `+`, so `"2.0"`, `"3."` and `"2 of 5"` resolve while
/// `"#2"` and `"two"` do not. Only positions within `1..=songs_len` resolve.
fn resolve_position(song_id: &str, songs_len: usize) -> Option<usize> {
    let trimmed = song_id.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let position: usize = unsigned[..digits_end].parse().ok()?;
    let index = position.checked_sub(1)?;
    (index < songs_len).then_some(index)
}

/// Maps the model's positional references back to the caller's song ids.
///
/// Entries that do not resolve are dropped. Order follows the model's reply
/// and no upper bound is applied to the count.
pub fn map_recommendations(raw: Vec<RawRecommendation>, songs: &[Song]) -> Vec<Recommendation> {
    raw.into_iter()
        .filter_map(|entry| {
            let index = entry
                .song_id
                .as_deref()
                .and_then(|id| resolve_position(id, songs.len()));
            match index {
                Some(index) => Some(Recommendation {
                    song_id: songs[index].id.clone(),
                    reason: entry.reason,
                }),
                None => {
                    debug!(
                        song_id = ?entry.song_id,
                        song_count = songs.len(),
                        "Dropping recommendation with unresolvable song reference"
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs() -> Vec<Song> {
        vec![
            Song::new("id-a", "A", "Artist"),
            Song::new("id-b", "B", "Artist"),
            Song::new("id-c", "C", "Artist"),
        ]
    }

    fn raw(song_id: Option<&str>, reason: &str) -> RawRecommendation {
        RawRecommendation {
            song_id: song_id.map(str::to_string),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn maps_positions_to_real_ids_in_model_order() {
        let mapped = map_recommendations(
            vec![raw(Some("3"), "third"), raw(Some("1"), "first")],
            &songs(),
        );
        assert_eq!(
            mapped,
            vec![
                Recommendation {
                    song_id: "id-c".to_string(),
                    reason: "third".to_string()
                },
                Recommendation {
                    song_id: "id-a".to_string(),
                    reason: "first".to_string()
                },
            ]
        );
    }

    #[test]
    fn drops_out_of_range_and_non_numeric_references() {
        let mapped = map_recommendations(
            vec![
                raw(Some("0"), "zero"),
                raw(Some("4"), "past the end"),
                raw(Some("-1"), "negative"),
                raw(Some("two"), "words"),
                raw(Some("#2"), "leading junk"),
                raw(Some(""), "empty"),
                raw(Some("99999999999999999999999"), "overflow"),
                raw(None, "missing"),
                raw(Some(" 2 "), "padded"),
            ],
            &songs(),
        );
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].song_id, "id-b");
        assert_eq!(mapped[0].reason, "padded");
    }

    #[test]
    fn leading_digits_decide_the_position() {
        let mapped = map_recommendations(
            vec![
                raw(Some("2.0"), "float"),
                raw(Some("3."), "trailing dot"),
                raw(Some("1abc"), "trailing junk"),
                raw(Some("+3"), "plus sign"),
                raw(Some("2.9"), "fraction"),
            ],
            &songs(),
        );
        let ids: Vec<_> = mapped.iter().map(|rec| rec.song_id.as_str()).collect();
        assert_eq!(ids, vec!["id-b", "id-c", "id-a", "id-c", "id-b"]);
    }

    #[test]
    fn numeric_json_ids_survive_extraction_and_mapping() {
        use crate::recommendation::extract_raw_recommendations;

        let raw = extract_raw_recommendations(
            r##"[{"songId":2.0,"reason":"float"},{"songId":"3.","reason":"dot"},{"songId":"#2","reason":"hash"}]"##,
        )
        .unwrap();
        let mapped = map_recommendations(raw, &songs());
        assert_eq!(
            mapped,
            vec![
                Recommendation {
                    song_id: "id-b".to_string(),
                    reason: "float".to_string()
                },
                Recommendation {
                    song_id: "id-c".to_string(),
                    reason: "dot".to_string()
                },
            ]
        );
    }

    #[test]
    fn output_is_always_a_subset_of_input() {
        let songs = songs();
        let raw_entries: Vec<_> = (0..20).map(|i| raw(Some(&i.to_string()), "r")).collect();
        let mapped = map_recommendations(raw_entries, &songs);
        assert_eq!(mapped.len(), 3);
        assert!(mapped
            .iter()
            .all(|rec| songs.iter().any(|song| song.id == rec.song_id)));
    }

    #[test]
    fn does_not_cap_the_count() {
        let raw_entries: Vec<_> = (0..7).map(|_| raw(Some("1"), "again")).collect();
        assert_eq!(map_recommendations(raw_entries, &songs()).len(), 7);
    }

    #[test]
    fn empty_song_list_maps_nothing() {
        assert!(map_recommendations(vec![raw(Some("1"), "r")], &[]).is_empty());
    }
}
