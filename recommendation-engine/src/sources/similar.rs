//! Candidate supplier

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::blackboard::Blackboard;
use crate::sources::KnowledgeSource;
use common::{Candidate, Feedback, SourceId};
use data_provider::{TrackInfo, TrackProvider};

#[derive(Debug, Clone)]
pub struct SimilarConfig {
    /// How many related artists to rank when building a feed.
    pub similar_artist_limit: usize,
}

impl Default for SimilarConfig {
    fn default() -> Self {
        Self {
            similar_artist_limit: 20,
        }
    }
}

/// Keeps the pool supplied with the top tracks of artists related to the
/// current seed.
///
/// The feed is built once per seed artist and holds the closest artists at
/// the front; draws come off the tail, so the least-similar option is
/// consumed first and the best matches are saved for later rounds.
pub struct SimilarTrackSource {
    provider: Arc<dyn TrackProvider>,
    config: SimilarConfig,
    /// Seed artist the current feed was built for.
    thinking_about: Option<String>,
    feed: Vec<TrackInfo>,
}

impl SimilarTrackSource {
    pub fn new(provider: Arc<dyn TrackProvider>) -> Self {
        Self::with_config(provider, SimilarConfig::default())
    }

    pub fn with_config(provider: Arc<dyn TrackProvider>, config: SimilarConfig) -> Self {
        Self {
            provider,
            config,
            thinking_about: None,
            feed: Vec::new(),
        }
    }

    /// Pull up to `count` unique candidates off the feed into the pool,
    /// rebuilding the feed first if the seed artist changed. Feed
    /// exhaustion admits fewer than `count`; it is not an error.
    pub async fn gather(
        &mut self,
        board: &mut Blackboard,
        artist: &str,
        _track: &str,
        count: usize,
    ) -> Result<usize> {
        if self.thinking_about.as_deref() != Some(artist) {
            self.thinking_about = Some(artist.to_string());
            self.feed = self.build_feed(artist).await?;
        }

        let mut admitted = 0;
        for _ in 0..count {
            match self.next_unique(board).await? {
                Some(candidate) => {
                    board.admit(candidate)?;
                    admitted += 1;
                }
                None => {
                    debug!(artist, "feed exhausted");
                    break;
                }
            }
        }
        info!(artist, admitted, "gathered candidates");
        Ok(admitted)
    }

    async fn build_feed(&self, artist: &str) -> Result<Vec<TrackInfo>> {
        let similar = self
            .provider
            .similar_artists(artist, self.config.similar_artist_limit)
            .await?;
        debug!(artist, count = similar.len(), "ranked similar artists");

        let mut feed = Vec::with_capacity(similar.len());
        for name in &similar {
            feed.push(self.provider.top_track(name).await?);
        }
        Ok(feed)
    }

    /// Pop feed items until one clears the de-duplication check. Each draw
    /// is enriched with a full metadata lookup first; the feed only holds
    /// bare top-track records.
    async fn next_unique(&mut self, board: &Blackboard) -> Result<Option<Candidate>> {
        while let Some(summary) = self.feed.pop() {
            let fetched = self
                .provider
                .track_info(&summary.artist, &summary.name)
                .await?;
            let mut candidate = fetched.into_candidate(SourceId::Similar);
            if board.considered(&candidate.key) {
                debug!(track = %candidate.key, "already considered, discarding");
                continue;
            }
            candidate.subscribe(SourceId::Similar);
            return Ok(Some(candidate));
        }
        Ok(None)
    }
}

impl KnowledgeSource for SimilarTrackSource {
    fn id(&self) -> SourceId {
        SourceId::Similar
    }

    /// Refilling after a rejection is a cycle-level decision; the arbiter
    /// triggers it using the candidate's provenance.
    fn on_feedback(&mut self, _board: &mut Blackboard, _candidate: &Candidate, _feedback: Feedback) {
    }
}
