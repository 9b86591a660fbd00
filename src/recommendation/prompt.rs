use super::models::Song;

/// How many songs the model is asked to pick.
pub const REQUESTED_RECOMMENDATIONS: usize = 5;

/// Builds the instruction sent to the model.
///
/// Songs are listed as `<position>. <title> by <artist>` with 1-based
/// positions; the model is told to answer with those positions as `songId`.
/// `category` and `option` are embedded verbatim.
pub fn build_prompt(category: &str, option: &str, songs: &[Song]) -> String {
    let song_list = songs
        .iter()
        .enumerate()
        .map(|(index, song)| format!("{}. {} by {}", index + 1, song.title, song.artist))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"I have a list of songs and I want recommendations based on {category}: "{option}".

Here are the songs I have:
{song_list}

Please recommend {count} songs from this list that would be good for {option} {category}.
For each song, provide a brief reason why it's a good fit.

Format your response as a JSON array with objects containing:
- songId: the ID of the song (use the number shown before the song as the ID, as a string)
- reason: a short explanation of why this song fits the {category}

Example format:
[
  {{
    "songId": "1",
    "reason": "Upbeat tempo and positive lyrics perfect for morning energy"
  }},
  ...
]

Only return the JSON array, nothing else."#,
        count = REQUESTED_RECOMMENDATIONS,
    )
}
