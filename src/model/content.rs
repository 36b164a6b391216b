//! Content view state: search results and the playlist library cache

use std::collections::BTreeMap;

use super::types::{SearchFilter, Track};

/// Results of the last search, with the facet used to narrow them
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub query: String,
    pub tracks: Vec<Track>,
    pub filter: SearchFilter,
}

impl SearchResults {
    /// Tracks visible under the current facet.
    ///
    /// The catalog only returns songs, so `Albums` never has anything to show.
    pub fn filtered(&self) -> Vec<Track> {
        match self.filter {
            SearchFilter::All | SearchFilter::Songs => self.tracks.clone(),
            SearchFilter::Artists => {
                let query = self.query.to_lowercase();
                self.tracks
                    .iter()
                    .filter(|t| t.artist.to_lowercase().contains(&query))
                    .cloned()
                    .collect()
            }
            SearchFilter::Albums => Vec::new(),
        }
    }
}

/// The playlist currently opened in the playlist screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpenPlaylist {
    pub id: String,
    pub tracks: Vec<Track>,
}

/// Cached copy of the remote playlist library.
///
/// Only replaced wholesale after a successful store call, so a failed call
/// leaves the previous (possibly stale) copy in place.
#[derive(Clone, Debug, Default)]
pub struct LibraryState {
    pub playlists: BTreeMap<String, String>,
    pub open: Option<OpenPlaylist>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, artist: &str) -> Track {
        Track {
            name: name.to_string(),
            artist: artist.to_string(),
            ..Default::default()
        }
    }

    fn results(filter: SearchFilter) -> SearchResults {
        SearchResults {
            query: "daft".to_string(),
            tracks: vec![
                track("One More Time", "Daft Punk"),
                track("Daft Song", "Someone Else"),
            ],
            filter,
        }
    }

    #[test]
    fn all_and_songs_show_everything() {
        assert_eq!(results(SearchFilter::All).filtered().len(), 2);
        assert_eq!(results(SearchFilter::Songs).filtered().len(), 2);
    }

    #[test]
    fn artists_match_artist_name_case_insensitively() {
        let filtered = results(SearchFilter::Artists).filtered();
        assert_eq!(filtered, vec![track("One More Time", "Daft Punk")]);
    }

    #[test]
    fn albums_is_always_empty() {
        assert!(results(SearchFilter::Albums).filtered().is_empty());
    }
}
