//! Core type definitions for the application

use serde::{Deserialize, Serialize};

/// A playable song's display metadata plus its preview location.
///
/// Tracks carry no identity of their own; two tracks with equal fields are
/// the same track. Queue navigation never relies on that, see `Queue`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub name: String,
    pub artist: String,
    /// Empty when the preview backend had nothing for this track
    pub preview_url: String,
    /// Pre-formatted `m:ss`
    pub duration: String,
    pub image_url: String,
}

impl Track {
    pub fn has_preview(&self) -> bool {
        !self.preview_url.is_empty()
    }
}

/// A named playlist as stored remotely
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Track>,
}

/// Name shown for stored playlists that have no name field
pub const UNTITLED_PLAYLIST: &str = "Untitled";

/// Facet applied to search results
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchFilter {
    #[default]
    All,
    Songs,
    Artists,
    Albums,
}

impl SearchFilter {
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Songs,
            Self::Songs => Self::Artists,
            Self::Artists => Self::Albums,
            Self::Albums => Self::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Songs => "Songs",
            Self::Artists => "Artists",
            Self::Albums => "Albums",
        }
    }
}

/// Format a millisecond duration as `m:ss`
pub fn format_duration(duration_ms: u32) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
