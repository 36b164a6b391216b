//! Client session: owns the collaborators and the controllers built on them
//!
//! A session is constructed once, handed to the presentation layer, and torn
//! down with `dispose`. Nothing here is global.

use std::sync::Arc;

#[cfg(feature = "rodio-engine")]
use anyhow::{bail, Result};

use crate::api::{PreviewResolver, TrackCatalog};
use crate::audio::AudioEngine;
use crate::config::AppConfig;
use crate::controller::{PlaybackController, PlaylistLibrary, SearchService};
use crate::model::Track;
use crate::store::PlaylistStore;

/// External collaborators a session is built from
pub struct SessionDeps {
    pub catalog: Arc<dyn TrackCatalog>,
    pub preview: Arc<dyn PreviewResolver>,
    pub store: Arc<dyn PlaylistStore>,
    pub engine: Arc<dyn AudioEngine>,
}

pub struct Session {
    playback: PlaybackController,
    library: PlaylistLibrary,
    search: SearchService,
}

impl Session {
    /// Wire the controllers, start the engine listener and load the playlist listing
    pub async fn init(config: &AppConfig, deps: SessionDeps) -> Self {
        let playback = PlaybackController::new(deps.engine, deps.preview.clone(), &config.playback);
        let library = PlaylistLibrary::new(deps.store);
        let search = SearchService::new(deps.catalog, deps.preview, config.catalog.search_limit);

        playback.init().await;
        if let Err(e) = library.refresh().await {
            tracing::warn!(error = %e, "Starting with an empty playlist listing");
        }

        tracing::info!("Session initialized");
        Self {
            playback,
            library,
            search,
        }
    }

    /// Build the real collaborators from `config` and initialize a session
    #[cfg(feature = "rodio-engine")]
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        use crate::api::{HttpPreviewResolver, SpotifyCatalog};
        use crate::audio::RodioEngine;
        use crate::config::StoreConfig;
        use crate::store::{FirestorePlaylistStore, InMemoryPlaylistStore};

        if !config.has_catalog_credentials() {
            bail!("RSPOTIFY_CLIENT_ID and RSPOTIFY_CLIENT_SECRET must be set");
        }

        let catalog = SpotifyCatalog::connect(&config.catalog.client_id, &config.catalog.client_secret).await?;
        let preview = HttpPreviewResolver::new(&config.preview.base_url, config.preview.timeout)?;
        let store: Arc<dyn PlaylistStore> = match &config.store {
            StoreConfig::Memory => {
                tracing::info!("Using in-memory playlist store");
                Arc::new(InMemoryPlaylistStore::new())
            }
            StoreConfig::Firestore {
                base_url,
                project_id,
                api_key,
                timeout,
            } => {
                tracing::info!(project_id = %project_id, ?timeout, "Using Firestore playlist store");
                Arc::new(FirestorePlaylistStore::new(base_url, project_id, api_key.clone(), *timeout)?)
            }
        };
        let engine = RodioEngine::new(config.preview.timeout)?;

        let deps = SessionDeps {
            catalog: Arc::new(catalog),
            preview: Arc::new(preview),
            store,
            engine: Arc::new(engine),
        };
        Ok(Self::init(config, deps).await)
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn library(&self) -> &PlaylistLibrary {
        &self.library
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    /// Play entry `index` of the visible search results. Search results
    /// never form a queue, so the queue is cleared first.
    pub async fn play_search_result(&self, index: usize) -> Option<Track> {
        let Some(track) = self.search.track_at(index).await else {
            tracing::debug!(index, "No search result at index");
            return None;
        };
        self.playback.clear_queue().await;
        self.playback.select_track(&track).await;
        self.playback.play(&track.preview_url).await;
        Some(track)
    }

    /// Queue the open playlist and play its slot `index`
    pub async fn play_playlist_track(&self, index: usize) -> Option<Track> {
        let Some(open) = self.library.open_playlist_state().await else {
            tracing::debug!(index, "No playlist is open");
            return None;
        };
        self.playback.set_queue(open.tracks).await;
        let track = self.playback.select_queue_entry(index).await?;
        self.playback.play(&track.preview_url).await;
        Some(track)
    }

    /// Stop background work and release audio. Safe to call more than once.
    pub async fn dispose(&self) {
        self.playback.dispose().await;
        tracing::info!("Session disposed");
    }
}
