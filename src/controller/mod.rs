//! Controller module - Application logic driving playback, search and playlists
//!
//! - `playback`: User intents (select, play, pause, skip, shuffle/repeat)
//! - `progress`: Periodic progress sampling while something plays
//! - `player_events`: Engine completion listener and the advance policy
//! - `library`: Playlist CRUD over the remote store with a local cache
//! - `search`: Catalog search with preview enrichment and facets

mod library;
mod playback;
mod player_events;
mod progress;
mod search;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::PreviewResolver;
use crate::audio::AudioEngine;
use crate::config::PlaybackConfig;
use crate::model::{PlaybackInfo, PlaybackSession};

pub use library::PlaylistLibrary;
pub use search::{SearchService, GENRE_SHORTCUTS};

use progress::ProgressPoller;

/// Owner of the playback session.
///
/// Cloning is cheap and every clone drives the same session. Intents that
/// touch the engine are serialized, so a user skip and a completion-driven
/// advance can never interleave.
#[derive(Clone)]
pub struct PlaybackController {
    pub(crate) session: Arc<Mutex<PlaybackSession>>,
    pub(crate) engine: Arc<dyn AudioEngine>,
    preview: Arc<dyn PreviewResolver>,
    intents: Arc<Mutex<()>>,
    poller: Arc<Mutex<Option<ProgressPoller>>>,
    listener: Arc<Mutex<Option<JoinHandle<()>>>>,
    state_tx: Arc<watch::Sender<PlaybackInfo>>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl PlaybackController {
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        preview: Arc<dyn PreviewResolver>,
        config: &PlaybackConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(PlaybackInfo::default());
        Self {
            session: Arc::new(Mutex::new(PlaybackSession::new())),
            engine,
            preview,
            intents: Arc::new(Mutex::new(())),
            poller: Arc::new(Mutex::new(None)),
            listener: Arc::new(Mutex::new(None)),
            state_tx: Arc::new(state_tx),
            poll_interval: config.poll_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Start listening for engine completions. Calling it twice is harmless.
    pub async fn init(&self) {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return;
        }
        match self.engine.event_channel() {
            Some(channel) => *listener = Some(self.start_engine_event_listener(channel)),
            None => tracing::warn!("Engine event channel already taken, auto-advance disabled"),
        }
    }

    /// Stop every background task and release the audio resource.
    /// Intents issued afterwards do nothing.
    pub async fn dispose(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        tracing::info!("Disposing playback controller");
        self.shutdown.cancel();

        let _intent = self.intents.lock().await;
        self.stop_progress().await;
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
        }
        self.engine.release().await;

        let mut session = self.session.lock().await;
        session.load_id = None;
        session.stop();
        self.publish(&session);
    }

    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub async fn snapshot(&self) -> PlaybackInfo {
        self.session.lock().await.snapshot()
    }

    /// Watch every published change of the playback state
    pub fn subscribe(&self) -> watch::Receiver<PlaybackInfo> {
        self.state_tx.subscribe()
    }

    pub(crate) fn publish(&self, session: &PlaybackSession) {
        self.state_tx.send_replace(session.snapshot());
    }

    async fn start_progress(&self) {
        let mut poller = self.poller.lock().await;
        if let Some(previous) = poller.take() {
            previous.stop().await;
        }
        *poller = Some(ProgressPoller::spawn(
            self.session.clone(),
            self.engine.clone(),
            self.state_tx.clone(),
            self.poll_interval,
        ));
    }

    /// Must not be called while holding the session lock
    async fn stop_progress(&self) {
        if let Some(poller) = self.poller.lock().await.take() {
            poller.stop().await;
        }
    }
}
