//! Playback-related types and state management

use std::time::Duration;

use super::queue::Queue;
use super::types::Track;

/// The selected track together with the queue slot it was selected from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentTrack {
    pub track: Track,
    pub position: Option<usize>,
}

/// Mutable state of the single playback session.
///
/// `is_playing` is never true while `current` is `None`, and `progress`
/// stays within `[0, 1]`.
#[derive(Clone, Debug, Default)]
pub struct PlaybackSession {
    current: Option<CurrentTrack>,
    is_playing: bool,
    progress: f32,
    pub shuffle: bool,
    pub repeat: bool,
    queue: Queue,
    /// Engine load that currently owns the audio slot
    pub load_id: Option<u64>,
    pub error_message: Option<String>,
}

impl PlaybackSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CurrentTrack> {
        self.current.as_ref()
    }

    pub fn current_position(&self) -> Option<usize> {
        self.current.as_ref().and_then(|c| c.position)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Select a track by value; its queue slot is the first structural match.
    pub fn select(&mut self, track: &Track) {
        let position = self.queue.position_of(track);
        self.current = Some(CurrentTrack {
            track: track.clone(),
            position,
        });
    }

    /// Select an exact queue slot. Returns the selected track, if the slot exists.
    pub fn select_position(&mut self, position: usize) -> Option<Track> {
        let track = self.queue.get(position)?.clone();
        self.current = Some(CurrentTrack {
            track: track.clone(),
            position: Some(position),
        });
        Some(track)
    }

    /// Replace the queue, re-resolving the current track's slot against it.
    pub fn set_queue(&mut self, queue: Queue) {
        self.queue = queue;
        if let Some(current) = self.current.as_mut() {
            let still_there = current
                .position
                .and_then(|p| self.queue.get(p))
                .is_some_and(|t| *t == current.track);
            if !still_there {
                current.position = self.queue.position_of(&current.track);
            }
        }
    }

    /// Mark playback as started or stopped; refuses to play with nothing selected.
    pub fn set_playing(&mut self, is_playing: bool) -> bool {
        self.is_playing = is_playing && self.current.is_some();
        self.is_playing
    }

    pub fn set_progress(&mut self, progress: f32) {
        self.progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Terminal stop: nothing plays and progress resets
    pub fn stop(&mut self) {
        self.is_playing = false;
        self.progress = 0.0;
    }

    pub fn snapshot(&self) -> PlaybackInfo {
        PlaybackInfo {
            track: self.current.as_ref().map(|c| c.track.clone()),
            queue_position: self.current_position(),
            queue_len: self.queue.len(),
            is_playing: self.is_playing,
            progress: self.progress,
            shuffle: self.shuffle,
            repeat: self.repeat,
            error_message: self.error_message.clone(),
        }
    }
}

/// Complete playback information for rendering the UI
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackInfo {
    pub track: Option<Track>,
    pub queue_position: Option<usize>,
    pub queue_len: usize,
    pub is_playing: bool,
    pub progress: f32,
    pub shuffle: bool,
    pub repeat: bool,
    pub error_message: Option<String>,
}

/// Fraction of the track played, clamped to `[0, 1]`.
///
/// An unknown or zero duration reports no progress.
pub fn compute_progress(position: Option<Duration>, duration: Option<Duration>) -> f32 {
    match (position, duration) {
        (Some(position), Some(duration)) if !duration.is_zero() => {
            (position.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}
