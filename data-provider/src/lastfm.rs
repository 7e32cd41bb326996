//! Audioscrobbler 2.0 API client
//!
//! One GET endpoint, method selected by query parameter, JSON responses.
//! Two wire quirks are handled here so the rest of the engine never sees
//! them: numeric fields arrive as strings, and list fields collapse to a
//! bare object when they hold a single element.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::provider::{ProviderError, TrackInfo, TrackProvider};
use async_trait::async_trait;

pub const DEFAULT_API_ROOT: &str = "https://ws.audioscrobbler.com/2.0/";

/// Connection settings for the audioscrobbler API.
///
/// Constructed explicitly and handed to the client; there is no process-wide
/// key or shared mutable configuration.
#[derive(Debug, Clone)]
pub struct LastFmConfig {
    pub api_key: String,
    pub api_root: String,
    /// Ask the provider to correct common artist/track misspellings.
    pub autocorrect: bool,
}

impl LastFmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_root: DEFAULT_API_ROOT.to_string(),
            autocorrect: true,
        }
    }

    /// Read `LASTFM_API_KEY` (and optionally `LASTFM_API_ROOT`) from the
    /// environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("LASTFM_API_KEY")
            .context("LASTFM_API_KEY is not set; get a key at https://www.last.fm/api")?;
        let mut config = Self::new(api_key);
        if let Ok(root) = std::env::var("LASTFM_API_ROOT") {
            config.api_root = root;
        }
        Ok(config)
    }
}

/// HTTP implementation of [`TrackProvider`].
pub struct LastFmClient {
    http: reqwest::Client,
    config: LastFmConfig,
}

impl LastFmClient {
    pub fn new(config: LastFmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let autocorrect = if self.config.autocorrect { "1" } else { "0" };
        let base = [
            ("method", method),
            ("api_key", self.config.api_key.as_str()),
            ("autocorrect", autocorrect),
            ("format", "json"),
        ];

        debug!(method, ?params, "last.fm request");
        let response = self
            .http
            .get(&self.config.api_root)
            .query(&base)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        // A 200 can still carry an error payload.
        if let Ok(failure) = serde_json::from_str::<ApiFailure>(&body) {
            return Err(ProviderError::Api {
                code: failure.error,
                message: failure.message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TrackProvider for LastFmClient {
    async fn track_info(&self, artist: &str, track: &str) -> Result<TrackInfo, ProviderError> {
        let response: TrackInfoResponse = self
            .call("track.getInfo", &[("artist", artist), ("track", track)])
            .await?;
        Ok(response.track.into_info())
    }

    async fn similar_artists(
        &self,
        artist: &str,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let limit = limit.to_string();
        let response: SimilarArtistsResponse = self
            .call("artist.getSimilar", &[("artist", artist), ("limit", &limit)])
            .await?;
        Ok(response
            .similarartists
            .artist
            .into_vec()
            .into_iter()
            .map(|a| a.name)
            .collect())
    }

    async fn top_track(&self, artist: &str) -> Result<TrackInfo, ProviderError> {
        let response: TopTracksResponse = self
            .call("artist.getTopTracks", &[("artist", artist), ("limit", "1")])
            .await?;
        response
            .toptracks
            .track
            .into_vec()
            .into_iter()
            .next()
            .map(WireTrack::into_info)
            .ok_or_else(|| ProviderError::NoTopTrack {
                artist: artist.to_string(),
            })
    }

    async fn top_tags(
        &self,
        artist: &str,
        track: &str,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let limit = limit.to_string();
        let response: TopTagsResponse = self
            .call(
                "track.getTopTags",
                &[("artist", artist), ("track", track), ("limit", &limit)],
            )
            .await?;
        Ok(response
            .toptags
            .tag
            .into_vec()
            .into_iter()
            .map(|t| t.name)
            .collect())
    }
}

/// In-band error payload, e.g. `{"error": 6, "message": "Track not found"}`.
#[derive(Debug, Deserialize)]
struct ApiFailure {
    error: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TrackInfoResponse {
    track: WireTrack,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistsResponse {
    similarartists: SimilarArtistList,
}

#[derive(Debug, Deserialize)]
struct SimilarArtistList {
    artist: OneOrMany<WireArtist>,
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    toptracks: TopTrackList,
}

#[derive(Debug, Deserialize)]
struct TopTrackList {
    #[serde(default)]
    track: OneOrMany<WireTrack>,
}

#[derive(Debug, Deserialize)]
struct TopTagsResponse {
    toptags: TagList,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    tag: OneOrMany<WireTag>,
}

#[derive(Debug, Deserialize)]
struct WireArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireTrack {
    name: String,
    artist: WireArtist,
    #[serde(default, deserialize_with = "stringly_u64")]
    listeners: u64,
    /// Milliseconds in `track.getInfo`, absent elsewhere.
    #[serde(default, deserialize_with = "stringly_u64")]
    duration: u64,
    #[serde(default, deserialize_with = "stringly_u64")]
    playcount: u64,
    #[serde(default)]
    url: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl WireTrack {
    fn into_info(self) -> TrackInfo {
        TrackInfo {
            artist: self.artist.name,
            name: self.name,
            listeners: self.listeners,
            duration_secs: self.duration / 1000,
            playcount: self.playcount,
            url: self.url,
            extra: self.extra,
        }
    }
}

/// A list field that collapses to a bare object when it has one element.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

/// Numbers arrive as JSON strings ("1234") as often as numbers.
fn stringly_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
