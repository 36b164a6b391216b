//! Playlist library: store operations plus the cached listing

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

use crate::model::{LibraryState, OpenPlaylist, Track};
use crate::store::PlaylistStore;

/// Cache holder over a `PlaylistStore`.
///
/// A successful write refreshes the affected cache; a failed one is logged
/// and the cache keeps its previous contents.
#[derive(Clone)]
pub struct PlaylistLibrary {
    store: Arc<dyn PlaylistStore>,
    state: Arc<RwLock<LibraryState>>,
}

impl PlaylistLibrary {
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(LibraryState::default())),
        }
    }

    /// Cached id -> name listing
    pub async fn playlists(&self) -> BTreeMap<String, String> {
        self.state.read().await.playlists.clone()
    }

    pub async fn open_playlist_state(&self) -> Option<OpenPlaylist> {
        self.state.read().await.open.clone()
    }

    /// Reload the listing from the store
    pub async fn refresh(&self) -> Result<()> {
        match self.store.list_all().await {
            Ok(playlists) => {
                tracing::debug!(count = playlists.len(), "Playlist listing refreshed");
                self.state.write().await.playlists = playlists;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load playlists");
                Err(e)
            }
        }
    }

    async fn refresh_after(&self, operation: &str) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(operation, error = %e, "Listing is stale after a successful write");
        }
    }

    pub async fn create_playlist(&self, name: &str) -> Result<String> {
        match self.store.create(name).await {
            Ok(id) => {
                tracing::info!(id = %id, name, "Playlist created");
                self.refresh_after("create").await;
                Ok(id)
            }
            Err(e) => {
                tracing::error!(name, error = %e, "Failed to create playlist");
                Err(e)
            }
        }
    }

    pub async fn rename_playlist(&self, id: &str, new_name: &str) -> Result<()> {
        if let Err(e) = self.store.rename(id, new_name).await {
            tracing::error!(id, new_name, error = %e, "Failed to rename playlist");
            return Err(e);
        }
        tracing::info!(id, new_name, "Playlist renamed");
        self.refresh_after("rename").await;
        Ok(())
    }

    pub async fn delete_playlist(&self, id: &str) -> Result<()> {
        if let Err(e) = self.store.delete(id).await {
            tracing::error!(id, error = %e, "Failed to delete playlist");
            return Err(e);
        }
        tracing::info!(id, "Playlist deleted");
        {
            let mut state = self.state.write().await;
            if state.open.as_ref().is_some_and(|open| open.id == id) {
                state.open = None;
            }
        }
        self.refresh_after("delete").await;
        Ok(())
    }

    /// Fetch a playlist's tracks and make it the open playlist
    pub async fn open_playlist(&self, id: &str) -> Result<Vec<Track>> {
        match self.store.fetch_tracks(id).await {
            Ok(tracks) => {
                tracing::debug!(id, count = tracks.len(), "Playlist opened");
                self.state.write().await.open = Some(OpenPlaylist {
                    id: id.to_string(),
                    tracks: tracks.clone(),
                });
                Ok(tracks)
            }
            Err(e) => {
                tracing::error!(id, error = %e, "Failed to fetch playlist tracks");
                Err(e)
            }
        }
    }

    pub async fn add_track(&self, track: &Track, id: &str) -> Result<()> {
        if let Err(e) = self.store.append_track(id, track).await {
            tracing::error!(id, track = %track.name, error = %e, "Failed to add track to playlist");
            return Err(e);
        }
        tracing::info!(id, track = %track.name, "Track added to playlist");

        let is_open = self
            .state
            .read()
            .await
            .open
            .as_ref()
            .is_some_and(|open| open.id == id);
        if is_open {
            // Keep the open copy in step; a failure here is already logged
            let _ = self.open_playlist(id).await;
        }
        Ok(())
    }

    /// Add one track to several playlists; returns how many succeeded
    pub async fn add_track_to_playlists(&self, track: &Track, ids: &[String]) -> usize {
        let mut added = 0;
        for id in ids {
            if self.add_track(track, id).await.is_ok() {
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryPlaylistStore;
    use anyhow::bail;
    use async_trait::async_trait;

    fn track(name: &str) -> Track {
        Track {
            name: name.to_string(),
            artist: "Artist".to_string(),
            preview_url: format!("http://p/{name}.mp3"),
            ..Default::default()
        }
    }

    /// Store that rejects every call
    struct BrokenStore;

    #[async_trait]
    impl PlaylistStore for BrokenStore {
        async fn create(&self, _name: &str) -> Result<String> {
            bail!("offline")
        }
        async fn rename(&self, _id: &str, _new_name: &str) -> Result<()> {
            bail!("offline")
        }
        async fn delete(&self, _id: &str) -> Result<()> {
            bail!("offline")
        }
        async fn list_all(&self) -> Result<BTreeMap<String, String>> {
            bail!("offline")
        }
        async fn fetch_tracks(&self, _id: &str) -> Result<Vec<Track>> {
            bail!("offline")
        }
        async fn append_track(&self, _id: &str, _track: &Track) -> Result<()> {
            bail!("offline")
        }
    }

    #[tokio::test]
    async fn create_then_delete_updates_listing() {
        let library = PlaylistLibrary::new(Arc::new(InMemoryPlaylistStore::new()));

        let id = library.create_playlist("Gym").await.unwrap();
        assert_eq!(library.playlists().await.get(&id).map(String::as_str), Some("Gym"));

        library.delete_playlist(&id).await.unwrap();
        assert!(!library.playlists().await.contains_key(&id));
    }

    #[tokio::test]
    async fn rename_refreshes_listing() {
        let library = PlaylistLibrary::new(Arc::new(InMemoryPlaylistStore::new()));
        let id = library.create_playlist("Old").await.unwrap();

        library.rename_playlist(&id, "New").await.unwrap();
        assert_eq!(library.playlists().await[&id], "New");
    }

    #[tokio::test]
    async fn adding_to_open_playlist_refreshes_its_tracks() {
        let library = PlaylistLibrary::new(Arc::new(InMemoryPlaylistStore::new()));
        let id = library.create_playlist("Mix").await.unwrap();
        library.open_playlist(&id).await.unwrap();

        library.add_track(&track("A"), &id).await.unwrap();
        assert_eq!(library.open_playlist_state().await.unwrap().tracks, vec![track("A")]);
    }

    #[tokio::test]
    async fn multi_add_counts_successes() {
        let library = PlaylistLibrary::new(Arc::new(InMemoryPlaylistStore::new()));
        let a = library.create_playlist("A").await.unwrap();
        let b = library.create_playlist("B").await.unwrap();

        let added = library
            .add_track_to_playlists(&track("X"), &[a.clone(), "missing".to_string(), b.clone()])
            .await;
        assert_eq!(added, 2);
    }

    #[tokio::test]
    async fn deleting_open_playlist_closes_it() {
        let library = PlaylistLibrary::new(Arc::new(InMemoryPlaylistStore::new()));
        let id = library.create_playlist("Temp").await.unwrap();
        library.open_playlist(&id).await.unwrap();

        library.delete_playlist(&id).await.unwrap();
        assert!(library.open_playlist_state().await.is_none());
    }

    #[tokio::test]
    async fn failures_leave_cache_untouched() {
        let store = Arc::new(InMemoryPlaylistStore::new());
        let seeded = PlaylistLibrary::new(store.clone());
        let id = seeded.create_playlist("Kept").await.unwrap();
        let cached = seeded.playlists().await;

        // Same cached state, but every further store call fails
        let library = PlaylistLibrary {
            store: Arc::new(BrokenStore),
            state: seeded.state.clone(),
        };

        assert!(library.create_playlist("New").await.is_err());
        assert!(library.rename_playlist(&id, "Renamed").await.is_err());
        assert!(library.delete_playlist(&id).await.is_err());
        assert!(library.refresh().await.is_err());
        assert!(library.open_playlist(&id).await.is_err());
        assert_eq!(library.playlists().await, cached);
        assert!(library.open_playlist_state().await.is_none());
    }
}
