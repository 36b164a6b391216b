//! External lookup services: the track catalog and the preview backend

mod catalog;
mod preview;

pub use catalog::{CatalogTrack, SpotifyCatalog, TrackCatalog, MAX_SEARCH_LIMIT};
pub use preview::{HttpPreviewResolver, PreviewResolver, PreviewResponse, PreviewResult};
