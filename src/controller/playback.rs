//! Playback control methods

use rand::thread_rng;

use crate::model::{PlaybackSession, Queue, Track};

use super::PlaybackController;

impl PlaybackController {
    /// Make `track` the current track without starting it.
    /// Waits for any load in progress, so a selection never lands mid-load.
    pub async fn select_track(&self, track: &Track) {
        let _intent = self.intents.lock().await;
        let mut session = self.session.lock().await;
        session.select(track);
        tracing::debug!(track = %track.name, position = ?session.current_position(), "Track selected");
        self.publish(&session);
    }

    /// Make the queue slot at `index` current. Returns its track if the slot exists.
    pub async fn select_queue_entry(&self, index: usize) -> Option<Track> {
        let _intent = self.intents.lock().await;
        let mut session = self.session.lock().await;
        let track = session.select_position(index);
        if track.is_some() {
            self.publish(&session);
        }
        track
    }

    pub async fn set_queue(&self, tracks: Vec<Track>) {
        let _intent = self.intents.lock().await;
        let mut session = self.session.lock().await;
        session.set_queue(Queue::new(tracks));
        tracing::debug!(len = session.queue().len(), "Queue replaced");
        self.publish(&session);
    }

    pub async fn clear_queue(&self) {
        self.set_queue(Vec::new()).await;
    }

    /// Load and start `url`, replacing whatever was loaded before.
    ///
    /// An empty URL means there is nothing to play and leaves everything as it
    /// was. Failures are logged and leave playback stopped.
    pub async fn play(&self, url: &str) {
        if url.is_empty() {
            tracing::debug!("No preview URL, nothing to play");
            return;
        }
        if self.is_disposed() {
            return;
        }
        let _intent = self.intents.lock().await;
        self.play_locked(url).await;
    }

    /// Body of `play`; the caller holds the intent lock
    pub(crate) async fn play_locked(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        let track_name = match self.session.lock().await.current() {
            Some(current) => current.track.name.clone(),
            None => {
                tracing::warn!(url, "Play requested with no track selected");
                return;
            }
        };

        self.stop_progress().await;
        self.engine.release().await;

        let load_id = match self.engine.load(url).await {
            Ok(load_id) => load_id,
            Err(e) => {
                tracing::error!(track = %track_name, url, error = %e, "Failed to load preview");
                self.fail_playback(format!("Could not load preview: {e}")).await;
                return;
            }
        };

        if let Err(e) = self.engine.play().await {
            tracing::error!(track = %track_name, error = %e, "Failed to start playback");
            self.engine.release().await;
            self.fail_playback(format!("Could not start playback: {e}")).await;
            return;
        }

        {
            let mut session = self.session.lock().await;
            session.load_id = Some(load_id);
            session.set_progress(0.0);
            session.set_playing(true);
            session.error_message = None;
            self.publish(&session);
        }
        tracing::info!(track = %track_name, load_id, "Playback started");
        self.start_progress().await;
    }

    async fn fail_playback(&self, message: String) {
        let mut session = self.session.lock().await;
        session.load_id = None;
        session.stop();
        session.error_message = Some(message);
        self.publish(&session);
    }

    /// Pause when playing, resume when paused. Does nothing with no track loaded.
    pub async fn toggle_playback(&self) {
        if self.is_disposed() {
            return;
        }
        let _intent = self.intents.lock().await;
        if !self.engine.is_loaded() {
            tracing::debug!("Toggle ignored, nothing loaded");
            return;
        }

        let is_playing = self.session.lock().await.is_playing();
        tracing::debug!(is_playing, "Toggling playback");

        if is_playing {
            if let Err(e) = self.engine.pause().await {
                tracing::warn!(error = %e, "Engine pause failed");
            }
            self.stop_progress().await;
            let mut session = self.session.lock().await;
            session.set_playing(false);
            self.publish(&session);
            tracing::info!(action = "paused", "Playback toggled");
        } else {
            match self.engine.play().await {
                Ok(()) => {
                    {
                        let mut session = self.session.lock().await;
                        session.set_playing(true);
                        self.publish(&session);
                    }
                    self.start_progress().await;
                    tracing::info!(action = "resumed", "Playback toggled");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Resume failed");
                    let mut session = self.session.lock().await;
                    session.set_playing(false);
                    session.error_message = Some(format!("Could not resume playback: {e}"));
                    self.publish(&session);
                }
            }
        }
    }

    /// Returns the new shuffle state
    pub async fn toggle_shuffle(&self) -> bool {
        let mut session = self.session.lock().await;
        session.shuffle = !session.shuffle;
        tracing::debug!(shuffle = session.shuffle, "Shuffle toggled");
        self.publish(&session);
        session.shuffle
    }

    /// Returns the new repeat state
    pub async fn toggle_repeat(&self) -> bool {
        let mut session = self.session.lock().await;
        session.repeat = !session.repeat;
        tracing::debug!(repeat = session.repeat, "Repeat toggled");
        self.publish(&session);
        session.repeat
    }

    /// Track in the slot after the current one
    pub async fn skip_to_next(&self) -> Option<Track> {
        let session = self.session.lock().await;
        session
            .queue()
            .next_after(session.current_position())
            .map(|(_, track)| track)
    }

    /// Track in the slot before the current one
    pub async fn skip_to_previous(&self) -> Option<Track> {
        let session = self.session.lock().await;
        session
            .queue()
            .previous_before(session.current_position())
            .map(|(_, track)| track)
    }

    /// Random queue track other than the current one (see `Queue::random_excluding`)
    pub async fn pick_random_track(&self) -> Option<Track> {
        let session = self.session.lock().await;
        session
            .queue()
            .random_excluding(session.current_position(), &mut thread_rng())
            .map(|(_, track)| track)
    }

    /// Explicit skip forward, following the advance policy
    pub async fn next(&self) {
        if self.is_disposed() {
            return;
        }
        let _intent = self.intents.lock().await;
        self.advance().await;
    }

    /// Play the previous queue slot, if there is one
    pub async fn previous(&self) {
        if self.is_disposed() {
            return;
        }
        let _intent = self.intents.lock().await;
        let url = {
            let mut session = self.session.lock().await;
            let Some((position, _)) = session.queue().previous_before(session.current_position()) else {
                tracing::debug!("Already at the start of the queue");
                return;
            };
            let track = session.select_position(position);
            self.publish(&session);
            track.map(|t| t.preview_url)
        };
        match url {
            Some(url) if !url.is_empty() => self.play_locked(&url).await,
            _ => self.halt().await,
        }
    }

    /// Stop playback and reset progress
    pub async fn stop(&self) {
        let _intent = self.intents.lock().await;
        self.halt().await;
    }

    /// Terminal stop; the caller holds the intent lock.
    /// The load is released, so a later toggle has nothing to resume.
    pub(crate) async fn halt(&self) {
        self.stop_progress().await;
        self.engine.release().await;
        let mut session = self.session.lock().await;
        session.load_id = None;
        session.stop();
        self.publish(&session);
    }

    /// Resolve a preview for a free-text query and play it
    pub async fn play_preview_for(&self, query: &str) {
        let url = self.preview.resolve(query).await;
        if url.is_empty() {
            tracing::info!(query, "No preview found for query");
            return;
        }
        let track = Track {
            name: query.to_string(),
            preview_url: url.clone(),
            ..Default::default()
        };
        self.select_track(&track).await;
        self.play(&url).await;
    }
}

/// Next slot and track according to the advance policy:
/// repeat replays the current track, else shuffle picks a random other
/// track, else the following slot is taken.
pub(crate) fn resolve_advance(session: &PlaybackSession) -> Option<(Option<usize>, Track)> {
    if session.repeat {
        if let Some(current) = session.current() {
            return Some((current.position, current.track.clone()));
        }
    }
    let position = session.current_position();
    let picked = if session.shuffle {
        session.queue().random_excluding(position, &mut thread_rng())
    } else {
        session.queue().next_after(position)
    };
    picked.map(|(slot, track)| (Some(slot), track))
}
