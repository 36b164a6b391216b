//! Audio engine abstraction
//!
//! The engine is a single-slot resource: at most one loaded stream exists,
//! and loading a new one requires releasing the previous one first.

#[cfg(feature = "rodio-engine")]
mod rodio_engine;
#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[cfg(feature = "rodio-engine")]
pub use rodio_engine::RodioEngine;

/// Notifications emitted by an engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// The stream created by the load with this id played to its end
    Finished { load_id: u64 },
}

pub type EngineEventChannel = mpsc::UnboundedReceiver<EngineEvent>;

#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Open and prepare the resource at `url`, paused at the start.
    /// Returns the id later carried by this load's events.
    async fn load(&self, url: &str) -> Result<u64>;

    /// Start or resume the loaded stream
    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Drop the loaded stream, if any. Never fails.
    async fn release(&self);

    fn is_loaded(&self) -> bool;

    fn position(&self) -> Option<Duration>;

    fn duration(&self) -> Option<Duration>;

    /// Hand out the event receiver. Only the first call gets it.
    fn event_channel(&self) -> Option<EngineEventChannel>;
}
