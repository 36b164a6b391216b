use anyhow::{bail, Result};

use spotify_preview::config::AppConfig;
use spotify_preview::logging;
use spotify_preview::model::{PlaybackInfo, Track};
use spotify_preview::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== spotify-preview starting ===");

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        bail!("usage: spotify-preview <search query>");
    }

    let config = AppConfig::from_env()?;
    let session = Session::connect(&config).await?;

    let result = run(&session, &query).await;
    session.dispose().await;

    if let Err(err) = &result {
        tracing::error!(error = ?err, "Application error");
    }
    tracing::info!("spotify-preview shutting down");
    result
}

/// Queue the results for `query`, play the first one with a preview and
/// report progress until Ctrl-C
async fn run(session: &Session, query: &str) -> Result<()> {
    let tracks = session.search().search(query).await;
    let Some(index) = tracks.iter().position(Track::has_preview) else {
        println!("No playable previews for {query:?}");
        return Ok(());
    };

    let playback = session.playback();
    let mut updates = playback.subscribe();
    playback.set_queue(tracks).await;
    if let Some(track) = playback.select_queue_entry(index).await {
        playback.play(&track.preview_url).await;
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut last = PlaybackInfo::default();

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal?;
                tracing::info!("Ctrl-C received");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let info = updates.borrow_and_update().clone();
                report(&last, &info);
                last = info;
            }
        }
    }
    Ok(())
}

fn report(last: &PlaybackInfo, info: &PlaybackInfo) {
    if let Some(error) = info.error_message.as_ref().filter(|e| last.error_message.as_ref() != Some(*e)) {
        println!("! {error}");
    }
    if info.track != last.track || info.is_playing != last.is_playing {
        match (&info.track, info.is_playing) {
            (Some(track), true) => println!("> {} - {} ({})", track.name, track.artist, track.duration),
            (Some(track), false) => println!("|| {} - {}", track.name, track.artist),
            (None, _) => {}
        }
    }
    tracing::debug!(progress = info.progress, is_playing = info.is_playing, "Playback update");
}
