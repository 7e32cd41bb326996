//! Track metadata providers
//!
//! The engine talks to the outside world through the [`TrackProvider`]
//! trait: full track metadata, similar-artist rankings, top tracks and top
//! tags. Two implementations:
//! - [`LastFmClient`] — HTTP client for the audioscrobbler 2.0 API
//! - [`StaticProvider`] — canned in-memory data for tests and offline demos

pub mod lastfm;
pub mod memory;
pub mod provider;

pub use lastfm::{LastFmClient, LastFmConfig};
pub use memory::StaticProvider;
pub use provider::{ProviderError, TrackInfo, TrackProvider};
