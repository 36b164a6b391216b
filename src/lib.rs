//! Preview-playing music browser client
//!
//! - `model`: Tracks, playlists, the queue and the playback session state
//! - `api`: Track catalog and preview lookup clients
//! - `store`: Remote playlist storage
//! - `audio`: Audio engine abstraction and the rodio engine
//! - `controller`: Playback, search and playlist controllers
//! - `session`: Owner of one client session

pub mod api;
pub mod audio;
pub mod config;
pub mod controller;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;
