//! The songs the client knows about and can play.

use crate::recommendation::{Recommendation, Song};
use serde::{Deserialize, Serialize};

const DEFAULT_LIBRARY_SIZE: usize = 18;
const DEFAULT_SONG_DURATION_SECS: u32 = 180;

/// A playable song with the display fields the recommendation flow does not
/// send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySong {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub image_url: String,
    pub audio_url: String,
    pub duration_secs: u32,
}

impl LibrarySong {
    pub fn to_song(&self) -> Song {
        Song::new(&self.id, &self.title, &self.artist)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Library {
    songs: Vec<LibrarySong>,
}

impl Library {
    pub fn new(songs: Vec<LibrarySong>) -> Self {
        Self { songs }
    }

    /// The placeholder catalog used when no songs were loaded.
    pub fn with_defaults() -> Self {
        let songs = (1..=DEFAULT_LIBRARY_SIZE)
            .map(|n| LibrarySong {
                id: format!("default-{}", n),
                title: format!("Song {}", n),
                artist: "Default Artist".to_string(),
                image_url: format!("/cover-images/{}.jpg", n),
                audio_url: format!("/songs/{}.mp3", n),
                duration_secs: DEFAULT_SONG_DURATION_SECS,
            })
            .collect();
        Self { songs }
    }

    /// Falls back to the default catalog when `songs` is empty.
    pub fn or_defaults(songs: Vec<LibrarySong>) -> Self {
        if songs.is_empty() {
            Self::with_defaults()
        } else {
            Self::new(songs)
        }
    }

    pub fn songs(&self) -> &[LibrarySong] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&LibrarySong> {
        self.songs.iter().find(|song| song.id == id)
    }

    /// The request payload, in library order; positions in this list are what
    /// the model refers to.
    pub fn request_songs(&self) -> Vec<Song> {
        self.songs.iter().map(LibrarySong::to_song).collect()
    }

    /// Resolves recommendations to playable songs, in recommendation order.
    /// Ids missing from the library are skipped.
    pub fn resolve_queue(&self, recommendations: &[Recommendation]) -> Vec<LibrarySong> {
        recommendations
            .iter()
            .filter_map(|rec| self.find(&rec.song_id).cloned())
            .collect()
    }
}
