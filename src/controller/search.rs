//! Catalog search with preview enrichment

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use crate::api::{PreviewResolver, TrackCatalog};
use crate::model::{SearchFilter, SearchResults, Track};

/// Quick queries offered next to the search box
pub const GENRE_SHORTCUTS: [&str; 4] = ["Pop", "Rock", "EDM", "R&B"];

/// Preview lookups in flight at once during enrichment
const PREVIEW_CONCURRENCY: usize = 8;

#[derive(Clone)]
pub struct SearchService {
    catalog: Arc<dyn TrackCatalog>,
    preview: Arc<dyn PreviewResolver>,
    limit: u32,
    results: Arc<RwLock<SearchResults>>,
}

impl SearchService {
    pub fn new(catalog: Arc<dyn TrackCatalog>, preview: Arc<dyn PreviewResolver>, limit: u32) -> Self {
        Self {
            catalog,
            preview,
            limit,
            results: Arc::new(RwLock::new(SearchResults::default())),
        }
    }

    /// Search the catalog and attach a preview URL to every hit, keeping the
    /// catalog's order. Returns the results visible under the current facet.
    pub async fn search(&self, query: &str) -> Vec<Track> {
        tracing::debug!(query, "Performing search");

        let hits = match self.catalog.search_tracks(query, self.limit).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!(query, error = %e, "Search failed");
                Vec::new()
            }
        };

        let preview = self.preview.clone();
        let tracks: Vec<Track> = stream::iter(hits)
            .map(|hit| {
                let preview = preview.clone();
                async move {
                    let url = preview.resolve(&hit.name).await;
                    hit.into_track(url)
                }
            })
            .buffered(PREVIEW_CONCURRENCY)
            .collect()
            .await;

        tracing::info!(
            query,
            tracks = tracks.len(),
            with_preview = tracks.iter().filter(|t| t.has_preview()).count(),
            "Search completed"
        );

        let mut results = self.results.write().await;
        results.query = query.to_string();
        results.tracks = tracks;
        results.filtered()
    }

    pub async fn search_genre(&self, genre: &str) -> Vec<Track> {
        self.search(genre).await
    }

    pub async fn set_filter(&self, filter: SearchFilter) {
        tracing::debug!(filter = filter.label(), "Search filter set");
        self.results.write().await.filter = filter;
    }

    /// Move to the next facet and return it
    pub async fn cycle_filter(&self) -> SearchFilter {
        let mut results = self.results.write().await;
        results.filter = results.filter.next();
        tracing::debug!(filter = results.filter.label(), "Search filter set");
        results.filter
    }

    pub async fn filter(&self) -> SearchFilter {
        self.results.read().await.filter
    }

    pub async fn results(&self) -> SearchResults {
        self.results.read().await.clone()
    }

    pub async fn filtered_results(&self) -> Vec<Track> {
        self.results.read().await.filtered()
    }

    /// Entry `index` of the currently visible results
    pub async fn track_at(&self, index: usize) -> Option<Track> {
        self.results.read().await.filtered().into_iter().nth(index)
    }
}
