//! Scripted engine for controller tests

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{AudioEngine, EngineEvent, EngineEventChannel};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    Load(String),
    Play,
    Pause,
    Release,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<EngineCall>,
    loaded: Option<(u64, String)>,
    next_load_id: u64,
    failing_urls: HashSet<String>,
    fail_play: bool,
    position: Option<Duration>,
    duration: Option<Duration>,
    load_delay: Option<Duration>,
}

pub struct FakeEngine {
    state: Mutex<FakeState>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: Mutex<Option<EngineEventChannel>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: Mutex::new(FakeState {
                duration: Some(Duration::from_secs(30)),
                ..Default::default()
            }),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                EngineCall::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn fail_url(&self, url: &str) {
        self.state.lock().unwrap().failing_urls.insert(url.to_string());
    }

    pub fn set_fail_play(&self, fail: bool) {
        self.state.lock().unwrap().fail_play = fail;
    }

    /// Make every following load take `delay` before it completes
    pub fn set_load_delay(&self, delay: Duration) {
        self.state.lock().unwrap().load_delay = Some(delay);
    }

    pub fn set_clock(&self, position: Option<Duration>, duration: Option<Duration>) {
        let mut state = self.state.lock().unwrap();
        state.position = position;
        state.duration = duration;
    }

    pub fn current_load_id(&self) -> Option<u64> {
        self.state.lock().unwrap().loaded.as_ref().map(|(id, _)| *id)
    }

    /// Pretend the loaded stream reached its end
    pub fn finish(&self) {
        if let Some(load_id) = self.current_load_id() {
            let _ = self.events_tx.send(EngineEvent::Finished { load_id });
        }
    }

    /// Emit a completion for an arbitrary (possibly stale) load
    pub fn finish_load(&self, load_id: u64) {
        let _ = self.events_tx.send(EngineEvent::Finished { load_id });
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn load(&self, url: &str) -> Result<u64> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(EngineCall::Load(url.to_string()));
            state.load_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.failing_urls.contains(url) {
            bail!("cannot open {url}");
        }
        state.next_load_id += 1;
        let id = state.next_load_id;
        state.loaded = Some((id, url.to_string()));
        Ok(id)
    }

    async fn play(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::Play);
        if state.fail_play {
            bail!("device unavailable");
        }
        if state.loaded.is_none() {
            bail!("nothing loaded");
        }
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.state.lock().unwrap().calls.push(EngineCall::Pause);
        Ok(())
    }

    async fn release(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::Release);
        state.loaded = None;
    }

    fn is_loaded(&self) -> bool {
        self.state.lock().unwrap().loaded.is_some()
    }

    fn position(&self) -> Option<Duration> {
        self.state.lock().unwrap().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state.lock().unwrap().duration
    }

    fn event_channel(&self) -> Option<EngineEventChannel> {
        self.events_rx.lock().unwrap().take()
    }
}
