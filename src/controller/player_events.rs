//! Engine event listener and the advance policy

use tokio::task::JoinHandle;

use crate::audio::{EngineEvent, EngineEventChannel};

use super::playback::resolve_advance;
use super::PlaybackController;

impl PlaybackController {
    pub(crate) fn start_engine_event_listener(&self, mut channel: EngineEventChannel) -> JoinHandle<()> {
        let controller = self.clone();
        let shutdown = self.shutdown.clone();
        tracing::info!("Starting engine event listener");

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    event = channel.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                match event {
                    EngineEvent::Finished { load_id } => {
                        tracing::debug!(load_id, "EngineEvent::Finished");
                        controller.handle_completion(load_id).await;
                    }
                }
            }
            tracing::debug!("Engine event listener shutting down");
        })
    }

    /// React to the end of a load. Completions of loads that were already
    /// replaced or released are ignored.
    pub(crate) async fn handle_completion(&self, load_id: u64) {
        let _intent = self.intents.lock().await;
        {
            let mut session = self.session.lock().await;
            if session.load_id != Some(load_id) {
                tracing::debug!(load_id, current = ?session.load_id, "Ignoring stale completion");
                return;
            }
            session.stop();
            self.publish(&session);
        }
        self.stop_progress().await;
        self.advance().await;
    }

    /// Apply the advance policy and play the chosen track; the caller holds
    /// the intent lock. Running out of tracks stops playback.
    pub(crate) async fn advance(&self) {
        let url = {
            let mut session = self.session.lock().await;
            let Some((position, track)) = resolve_advance(&session) else {
                drop(session);
                tracing::info!("End of queue, stopping");
                self.halt().await;
                return;
            };
            match position {
                Some(position) => {
                    session.select_position(position);
                }
                None => session.select(&track),
            }
            self.publish(&session);
            tracing::info!(track = %track.name, position = ?position, "Advancing");
            track.preview_url
        };

        if url.is_empty() {
            tracing::info!("Next track has no preview, stopping");
            self.halt().await;
        } else {
            self.play_locked(&url).await;
        }
    }
}
