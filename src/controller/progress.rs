//! Progress sampling while a track plays

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::audio::AudioEngine;
use crate::model::{compute_progress, PlaybackInfo, PlaybackSession};

/// Handle to a running sampling task
pub(crate) struct ProgressPoller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressPoller {
    pub(crate) fn spawn(
        session: Arc<Mutex<PlaybackSession>>,
        engine: Arc<dyn AudioEngine>,
        state_tx: Arc<watch::Sender<PlaybackInfo>>,
        interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let progress = compute_progress(engine.position(), engine.duration());
                let mut session = session.lock().await;
                // Also ends on its own if playback stopped without a cancel
                if token.is_cancelled() || !session.is_playing() {
                    break;
                }
                session.set_progress(progress);
                state_tx.send_replace(session.snapshot());
            }
            tracing::trace!("Progress poller stopped");
        });

        Self { cancel, handle }
    }

    /// Cancel and wait, so nothing is published after this returns
    pub(crate) async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
