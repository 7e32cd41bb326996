//! Canned in-memory provider (for testing and offline demos)

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{ProviderError, TrackInfo, TrackProvider};
use common::TrackKey;

/// A [`TrackProvider`] serving fixed data from maps.
///
/// Counts lookups per trait method so tests can assert caching behavior.
#[derive(Default)]
pub struct StaticProvider {
    tracks: HashMap<TrackKey, TrackInfo>,
    similar: HashMap<String, Vec<String>>,
    top_tracks: HashMap<String, TrackKey>,
    tags: HashMap<TrackKey, Vec<String>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, info: TrackInfo) -> Self {
        self.tracks.insert(info.key(), info);
        self
    }

    pub fn with_similar(mut self, artist: impl Into<String>, similar: Vec<String>) -> Self {
        self.similar.insert(artist.into(), similar);
        self
    }

    /// Declare `key` as the top track of `artist`. The full record must also
    /// be registered with [`with_track`](Self::with_track).
    pub fn with_top_track(mut self, artist: impl Into<String>, key: TrackKey) -> Self {
        self.top_tracks.insert(artist.into(), key);
        self
    }

    pub fn with_tags(mut self, key: TrackKey, tags: Vec<String>) -> Self {
        self.tags.insert(key, tags);
        self
    }

    /// How many times the named trait method has been called.
    pub fn calls(&self, method: &'static str) -> usize {
        *self.counters().get(method).unwrap_or(&0)
    }

    fn count(&self, method: &'static str) {
        *self.counters().entry(method).or_insert(0) += 1;
    }

    fn counters(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, usize>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lookup(&self, artist: &str, track: &str) -> Result<TrackInfo, ProviderError> {
        self.tracks
            .get(&TrackKey::new(artist, track))
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                code: 6,
                message: format!("Track not found: {artist} - {track}"),
            })
    }
}

#[async_trait]
impl TrackProvider for StaticProvider {
    async fn track_info(&self, artist: &str, track: &str) -> Result<TrackInfo, ProviderError> {
        self.count("track_info");
        self.lookup(artist, track)
    }

    async fn similar_artists(
        &self,
        artist: &str,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        self.count("similar_artists");
        let mut names = self.similar.get(artist).cloned().unwrap_or_default();
        names.truncate(limit);
        Ok(names)
    }

    async fn top_track(&self, artist: &str) -> Result<TrackInfo, ProviderError> {
        self.count("top_track");
        let key = self
            .top_tracks
            .get(artist)
            .ok_or_else(|| ProviderError::NoTopTrack {
                artist: artist.to_string(),
            })?;
        self.lookup(&key.artist, &key.title)
    }

    async fn top_tags(
        &self,
        artist: &str,
        track: &str,
        _limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        self.count("top_tags");
        Ok(self
            .tags
            .get(&TrackKey::new(artist, track))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(artist: &str, name: &str, playcount: u64) -> TrackInfo {
        let mut info = TrackInfo::new(artist, name);
        info.playcount = playcount;
        info
    }

    #[tokio::test]
    async fn serves_registered_data_and_counts_calls() {
        let provider = StaticProvider::new()
            .with_track(track("Pulp", "Common People", 100))
            .with_similar("Pulp", vec!["Blur".to_string(), "Suede".to_string()])
            .with_top_track("Blur", TrackKey::new("Blur", "Song 2"))
            .with_track(track("Blur", "Song 2", 200));

        let info = provider.track_info("Pulp", "Common People").await.unwrap();
        assert_eq!(info.playcount, 100);
        assert_eq!(provider.calls("track_info"), 1);

        let similar = provider.similar_artists("Pulp", 1).await.unwrap();
        assert_eq!(similar, vec!["Blur"]);

        let top = provider.top_track("Blur").await.unwrap();
        assert_eq!(top.name, "Song 2");

        assert!(matches!(
            provider.top_track("Suede").await,
            Err(ProviderError::NoTopTrack { .. })
        ));
        assert!(matches!(
            provider.track_info("Nobody", "Nothing").await,
            Err(ProviderError::Api { code: 6, .. })
        ));
    }
}
