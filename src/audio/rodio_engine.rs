//! Local audio output through rodio
//!
//! Previews are short, so a load downloads the whole clip and decodes it
//! from memory. The output stream lives on its own thread because rodio's
//! stream handle owner cannot move between threads.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc as std_mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::mpsc;

use super::{AudioEngine, EngineEvent, EngineEventChannel};

const DEVICE_THREAD_NAME: &str = "spotify-preview-output";
const END_POLL_INTERVAL: Duration = Duration::from_millis(250);

struct LoadedStream {
    load_id: u64,
    sink: Arc<Sink>,
    duration: Option<Duration>,
    released: Arc<AtomicBool>,
}

pub struct RodioEngine {
    handle: OutputStreamHandle,
    http: reqwest::Client,
    loaded: Mutex<Option<LoadedStream>>,
    next_load_id: AtomicU64,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: Mutex<Option<EngineEventChannel>>,
    shutdown: Mutex<Option<std_mpsc::Sender<()>>>,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn new(fetch_timeout: Duration) -> Result<Self> {
        let (handle_tx, handle_rx) = std_mpsc::channel();
        let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();

        thread::Builder::new()
            .name(DEVICE_THREAD_NAME.to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    let _ = handle_tx.send(Ok(handle));
                    // Keep the stream open until shutdown or the engine is dropped
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("Audio output stream closed");
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(anyhow!("no audio output device: {e}")));
                }
            })?;

        let handle = handle_rx
            .recv()
            .context("audio output thread exited early")??;

        let http = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        tracing::info!("Audio output initialized");

        Ok(Self {
            handle,
            http,
            loaded: Mutex::new(None),
            next_load_id: AtomicU64::new(1),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            shutdown: Mutex::new(Some(shutdown_tx)),
        })
    }

    fn with_sink<T>(&self, f: impl FnOnce(&LoadedStream) -> T) -> Option<T> {
        let guard = self.loaded.lock().ok()?;
        guard.as_ref().map(f)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Watch the sink until it drains, then report the end of this load.
    fn watch_for_end(&self, load_id: u64, sink: Arc<Sink>, released: Arc<AtomicBool>) {
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(END_POLL_INTERVAL);
            loop {
                ticker.tick().await;
                if released.load(Ordering::SeqCst) {
                    return;
                }
                if sink.empty() {
                    tracing::debug!(load_id, "Stream reached end");
                    let _ = events_tx.send(EngineEvent::Finished { load_id });
                    return;
                }
            }
        });
    }
}

#[async_trait]
impl AudioEngine for RodioEngine {
    async fn load(&self, url: &str) -> Result<u64> {
        let bytes = self
            .fetch(url)
            .await
            .with_context(|| format!("failed to fetch {url}"))?;
        tracing::debug!(url, bytes = bytes.len(), "Preview downloaded");

        let source = Decoder::new(Cursor::new(bytes)).context("unsupported audio data")?;
        let duration = source.total_duration();

        let sink = Sink::try_new(&self.handle)?;
        sink.pause();
        sink.append(source);
        let sink = Arc::new(sink);

        let load_id = self.next_load_id.fetch_add(1, Ordering::SeqCst);
        let released = Arc::new(AtomicBool::new(false));

        let previous = {
            let mut guard = self
                .loaded
                .lock()
                .map_err(|_| anyhow!("audio engine state poisoned"))?;
            guard.replace(LoadedStream {
                load_id,
                sink: sink.clone(),
                duration,
                released: released.clone(),
            })
        };
        if let Some(previous) = previous {
            previous.released.store(true, Ordering::SeqCst);
            previous.sink.stop();
        }

        self.watch_for_end(load_id, sink, released);
        Ok(load_id)
    }

    async fn play(&self) -> Result<()> {
        self.with_sink(|loaded| loaded.sink.play())
            .ok_or_else(|| anyhow!("no stream loaded"))
    }

    async fn pause(&self) -> Result<()> {
        self.with_sink(|loaded| loaded.sink.pause())
            .ok_or_else(|| anyhow!("no stream loaded"))
    }

    async fn release(&self) {
        let taken = match self.loaded.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(loaded) = taken {
            tracing::debug!(load_id = loaded.load_id, "Releasing stream");
            loaded.released.store(true, Ordering::SeqCst);
            loaded.sink.stop();
        }
    }

    fn is_loaded(&self) -> bool {
        self.with_sink(|_| ()).is_some()
    }

    fn position(&self) -> Option<Duration> {
        self.with_sink(|loaded| loaded.sink.get_pos())
    }

    fn duration(&self) -> Option<Duration> {
        self.with_sink(|loaded| loaded.duration).flatten()
    }

    fn event_channel(&self) -> Option<EngineEventChannel> {
        self.events_rx.lock().ok()?.take()
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.loaded.lock() {
            if let Some(loaded) = guard.take() {
                loaded.released.store(true, Ordering::SeqCst);
                loaded.sink.stop();
            }
        }
        if let Ok(mut shutdown) = self.shutdown.lock() {
            if let Some(tx) = shutdown.take() {
                let _ = tx.send(());
            }
        }
    }
}
