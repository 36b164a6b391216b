//! Remote playlist storage
//!
//! Playlists live in a document collection named `playlists`; each document
//! holds a `name` and an ordered `tracks` array. Appending is a union: a
//! track equal by value to one already stored is not added twice.

mod firestore;
mod memory;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::Track;

pub use firestore::{FirestorePlaylistStore, DEFAULT_FIRESTORE_URL};
pub use memory::InMemoryPlaylistStore;

pub const PLAYLISTS_COLLECTION: &str = "playlists";

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Create an empty playlist and return its new id
    async fn create(&self, name: &str) -> Result<String>;

    async fn rename(&self, id: &str, new_name: &str) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Every stored playlist, id to name
    async fn list_all(&self) -> Result<BTreeMap<String, String>>;

    async fn fetch_tracks(&self, id: &str) -> Result<Vec<Track>>;

    async fn append_track(&self, id: &str, track: &Track) -> Result<()>;
}
