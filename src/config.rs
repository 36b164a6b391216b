//! Runtime configuration
//!
//! Everything has a working default except the catalog credentials. Values
//! can be overridden from the environment; there is no config file.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::api::MAX_SEARCH_LIMIT;
use crate::store::DEFAULT_FIRESTORE_URL;

pub const DEFAULT_PREVIEW_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PREVIEW_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PREVIEW_URL.to_string(),
            timeout: DEFAULT_PREVIEW_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    pub client_id: String,
    pub client_secret: String,
    pub search_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            search_limit: MAX_SEARCH_LIMIT,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StoreConfig {
    #[default]
    Memory,
    Firestore {
        base_url: String,
        project_id: String,
        api_key: Option<String>,
        timeout: Duration,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub poll_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub preview: PreviewConfig,
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
    pub playback: PlaybackConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str| -> Result<Option<u64>> {
            get(key)
                .map(|v| v.trim().parse::<u64>().with_context(|| format!("{key} must be a number, got {v:?}")))
                .transpose()
        };

        let mut config = Self::default();

        if let Some(url) = get("PREVIEW_API_URL") {
            config.preview.base_url = url;
        }
        if let Some(secs) = number("PREVIEW_TIMEOUT_SECS")? {
            config.preview.timeout = Duration::from_secs(secs.max(1));
        }

        config.catalog.client_id = get("RSPOTIFY_CLIENT_ID").unwrap_or_default();
        config.catalog.client_secret = get("RSPOTIFY_CLIENT_SECRET").unwrap_or_default();
        if let Some(limit) = number("SEARCH_LIMIT")? {
            config.catalog.search_limit = limit.clamp(1, u64::from(MAX_SEARCH_LIMIT)) as u32;
        }

        if let Some(project_id) = get("FIRESTORE_PROJECT_ID") {
            let timeout = number("FIRESTORE_TIMEOUT_SECS")?
                .map_or(DEFAULT_STORE_TIMEOUT, |secs| Duration::from_secs(secs.max(1)));
            config.store = StoreConfig::Firestore {
                base_url: get("FIRESTORE_BASE_URL").unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string()),
                project_id,
                api_key: get("FIRESTORE_API_KEY"),
                timeout,
            };
        }

        if let Some(ms) = number("POLL_INTERVAL_MS")? {
            config.playback.poll_interval = Duration::from_millis(ms.max(1));
        }

        Ok(config)
    }

    pub fn has_catalog_credentials(&self) -> bool {
        !self.catalog.client_id.is_empty() && !self.catalog.client_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.preview.timeout, Duration::from_secs(5));
        assert_eq!(config.playback.poll_interval, Duration::from_secs(1));
        assert_eq!(config.store, StoreConfig::Memory);
        assert!(!config.has_catalog_credentials());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("PREVIEW_API_URL", "http://previews.local:8080"),
            ("PREVIEW_TIMEOUT_SECS", "2"),
            ("RSPOTIFY_CLIENT_ID", "id"),
            ("RSPOTIFY_CLIENT_SECRET", "secret"),
            ("SEARCH_LIMIT", "500"),
            ("FIRESTORE_PROJECT_ID", "music-app"),
            ("FIRESTORE_API_KEY", "key"),
            ("POLL_INTERVAL_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.preview.base_url, "http://previews.local:8080");
        assert_eq!(config.preview.timeout, Duration::from_secs(2));
        assert!(config.has_catalog_credentials());
        assert_eq!(config.catalog.search_limit, MAX_SEARCH_LIMIT);
        assert_eq!(
            config.store,
            StoreConfig::Firestore {
                base_url: DEFAULT_FIRESTORE_URL.to_string(),
                project_id: "music-app".to_string(),
                api_key: Some("key".to_string()),
                timeout: DEFAULT_STORE_TIMEOUT,
            }
        );
        assert_eq!(config.playback.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn zero_timeouts_are_raised_to_one_second() {
        let config = config_from(&[
            ("PREVIEW_TIMEOUT_SECS", "0"),
            ("FIRESTORE_PROJECT_ID", "music-app"),
            ("FIRESTORE_TIMEOUT_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.preview.timeout, Duration::from_secs(1));
        match config.store {
            StoreConfig::Firestore { timeout, .. } => assert_eq!(timeout, Duration::from_secs(1)),
            StoreConfig::Memory => panic!("expected the Firestore store"),
        }
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = config_from(&[("PREVIEW_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("PREVIEW_TIMEOUT_SECS"));
    }
}
