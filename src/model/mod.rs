//! Model module - Application state and data types
//!
//! - `types`: Core value types (tracks, playlists, search facets)
//! - `queue`: Positional queue used for next/previous/random resolution
//! - `playback`: Playback session state and the published snapshot
//! - `content`: Search results and the playlist library cache

mod content;
mod playback;
mod queue;
mod types;

pub use types::{format_duration, Playlist, SearchFilter, Track, UNTITLED_PLAYLIST};

pub use queue::Queue;

pub use playback::{compute_progress, CurrentTrack, PlaybackInfo, PlaybackSession};

pub use content::{LibraryState, OpenPlaylist, SearchResults};
