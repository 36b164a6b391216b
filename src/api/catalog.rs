//! Track catalog client (Spotify Web API, app-only auth)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rspotify::{
    model::{Country, Market, SearchResult, SearchType},
    prelude::*,
    ClientCredsSpotify, Config, Credentials,
};

use crate::model::{format_duration, Track};

/// Largest page the search endpoint accepts
pub const MAX_SEARCH_LIMIT: u32 = 50;

const UNKNOWN_ARTIST: &str = "Unknown";

/// Catalog metadata for one track, before preview enrichment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogTrack {
    pub name: String,
    pub artists: Vec<String>,
    pub duration_ms: u32,
    pub image_url: String,
}

impl CatalogTrack {
    /// Build the display track, attaching the resolved preview location
    pub fn into_track(self, preview_url: String) -> Track {
        let artist = self
            .artists
            .into_iter()
            .next()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        Track {
            name: self.name,
            artist,
            preview_url,
            duration: format_duration(self.duration_ms),
            image_url: self.image_url,
        }
    }
}

#[async_trait]
pub trait TrackCatalog: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<CatalogTrack>>;
}

/// Spotify search with client-credentials auth
#[derive(Clone)]
pub struct SpotifyCatalog {
    client: Arc<ClientCredsSpotify>,
}

impl SpotifyCatalog {
    /// Authenticate the app and return a ready client.
    pub async fn connect(client_id: &str, client_secret: &str) -> Result<Self> {
        let client = ClientCredsSpotify::with_config(
            Credentials::new(client_id, client_secret),
            Config {
                token_refreshing: true,
                ..Default::default()
            },
        );
        client.request_token().await?;
        tracing::debug!("rspotify app token acquired");
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl TrackCatalog for SpotifyCatalog {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<CatalogTrack>> {
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        crate::log_api_request!("search_tracks", query, limit);

        let result = self
            .client
            .search(
                query,
                SearchType::Track,
                Some(Market::Country(Country::UnitedStates)),
                None,
                Some(limit),
                None,
            )
            .await;
        crate::log_api_result!("search_tracks", result);

        let tracks = match result? {
            SearchResult::Tracks(page) => page
                .items
                .into_iter()
                .map(|track| CatalogTrack {
                    artists: track.artists.iter().map(|a| a.name.clone()).collect(),
                    duration_ms: track.duration.num_milliseconds().max(0) as u32,
                    image_url: track
                        .album
                        .images
                        .first()
                        .map(|image| image.url.clone())
                        .unwrap_or_default(),
                    name: track.name,
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_artist_wins_and_missing_artist_is_unknown() {
        let catalog_track = CatalogTrack {
            name: "Harder Better".to_string(),
            artists: vec!["Daft Punk".to_string(), "Guest".to_string()],
            duration_ms: 224_000,
            image_url: "http://img/1.jpg".to_string(),
        };
        let track = catalog_track.clone().into_track("http://p/1.mp3".to_string());
        assert_eq!(track.artist, "Daft Punk");
        assert_eq!(track.duration, "3:44");
        assert_eq!(track.preview_url, "http://p/1.mp3");
        assert_eq!(track.image_url, "http://img/1.jpg");

        let anonymous = CatalogTrack {
            artists: Vec::new(),
            ..catalog_track
        };
        assert_eq!(anonymous.into_track(String::new()).artist, "Unknown");
    }
}
