//! File-based logging module for spotify-preview
//!
//! Logs go to a file rather than stdout so that a presentation layer can own
//! the terminal or screen.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "spotify-preview";

/// Directives used when `RUST_LOG` is unset
const DEFAULT_DIRECTIVES: &[&str] = &[
    "spotify_preview=debug",
    "spotify_preview::api::preview=debug",
    "spotify_preview::store=debug",
    "spotify_preview::audio=info",
    "rspotify=info",
    "reqwest=warn",
    "rodio=warn",
    "warn",
];

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_DIRECTIVES.join(","))
}

/// Initialize the logging system.
///
/// Logs are written to `.logs/spotify-preview.YYYY-MM-DD.log` with daily rotation.
/// The log level can be controlled via the `RUST_LOG` environment variable.
///
/// Default levels are listed in `DEFAULT_DIRECTIVES`: debug for this crate
/// (info for the audio engine), info for `rspotify`, warn for the rest.
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);

    // Non-blocking so a slow disk never stalls the runtime
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes on drop; it has to outlive every log call
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized - logs written to {}/",
        LOG_DIR
    );

    Ok(())
}

/// Log the outcome of an external API call
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}

/// Log the start of an external API call with additional context
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "API request started");
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_all_parse() {
        for directive in DEFAULT_DIRECTIVES {
            assert!(
                directive.parse::<tracing_subscriber::filter::Directive>().is_ok(),
                "bad directive {directive}"
            );
        }
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES.join(",")).is_ok());
    }
}
