//! Process-local playlist store, used when no remote store is configured

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::PlaylistStore;
use crate::model::{Playlist, Track};

#[derive(Clone, Default)]
pub struct InMemoryPlaylistStore {
    playlists: Arc<RwLock<BTreeMap<String, Playlist>>>,
}

impl InMemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaylistStore for InMemoryPlaylistStore {
    async fn create(&self, name: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let playlist = Playlist {
            id: id.clone(),
            name: name.to_string(),
            tracks: Vec::new(),
        };
        self.playlists.write().await.insert(id.clone(), playlist);
        Ok(id)
    }

    async fn rename(&self, id: &str, new_name: &str) -> Result<()> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .get_mut(id)
            .ok_or_else(|| anyhow!("playlist {id} not found"))?;
        playlist.name = new_name.to_string();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.playlists.write().await.remove(id);
        Ok(())
    }

    async fn list_all(&self) -> Result<BTreeMap<String, String>> {
        let playlists = self.playlists.read().await;
        Ok(playlists
            .iter()
            .map(|(id, p)| (id.clone(), p.name.clone()))
            .collect())
    }

    async fn fetch_tracks(&self, id: &str) -> Result<Vec<Track>> {
        let playlists = self.playlists.read().await;
        playlists
            .get(id)
            .map(|p| p.tracks.clone())
            .ok_or_else(|| anyhow!("playlist {id} not found"))
    }

    async fn append_track(&self, id: &str, track: &Track) -> Result<()> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .get_mut(id)
            .ok_or_else(|| anyhow!("playlist {id} not found"))?;
        if !playlist.tracks.contains(track) {
            playlist.tracks.push(track.clone());
        }
        Ok(())
    }
}
