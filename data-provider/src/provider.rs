use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use common::{Candidate, SourceId, TrackKey};

/// Errors from an external metadata lookup.
///
/// These are non-local: the calling source surfaces them with `?` and the
/// current recommendation cycle ends. The engine never retries.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider answered 200 but with an in-band error payload.
    #[error("provider error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("malformed provider response: {0}")]
    Decode(String),

    #[error("no top track found for artist {artist}")]
    NoTopTrack { artist: String },
}

/// Full metadata for one track, as returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackInfo {
    pub artist: String,
    pub name: String,
    pub listeners: u64,
    pub duration_secs: u64,
    pub playcount: u64,
    pub url: Option<String>,
    /// Provider fields the engine has no named slot for.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TrackInfo {
    pub fn new(artist: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            name: name.into(),
            listeners: 0,
            duration_secs: 0,
            playcount: 0,
            url: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn key(&self) -> TrackKey {
        TrackKey::new(self.artist.clone(), self.name.clone())
    }

    /// Wrap this record as a blackboard candidate with the given provenance.
    pub fn into_candidate(self, source: SourceId) -> Candidate {
        let mut candidate = Candidate::new(TrackKey::new(self.artist, self.name), source);
        candidate.listeners = self.listeners;
        candidate.duration_secs = self.duration_secs;
        candidate.playcount = self.playcount;
        candidate.url = self.url;
        candidate.extra = self.extra;
        candidate
    }
}

/// External collaborator supplying track and artist metadata.
#[async_trait]
pub trait TrackProvider: Send + Sync {
    /// Full metadata for the named track.
    async fn track_info(&self, artist: &str, track: &str) -> Result<TrackInfo, ProviderError>;

    /// Artist names similar to `artist`, most-similar first.
    async fn similar_artists(&self, artist: &str, limit: usize)
        -> Result<Vec<String>, ProviderError>;

    /// The single most-played track of `artist`.
    async fn top_track(&self, artist: &str) -> Result<TrackInfo, ProviderError>;

    /// Top tags for the named track, in rank order. The limit is advisory:
    /// providers may return more, and callers truncate.
    async fn top_tags(
        &self,
        artist: &str,
        track: &str,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError>;
}
