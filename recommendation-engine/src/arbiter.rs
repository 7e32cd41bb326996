//! Recommendation cycle
//!
//! The arbiter owns the blackboard and the four knowledge sources. Each
//! cycle it collects the scoring sources' picks, resolves them into one
//! recommendation, and on feedback drives the notification fan-out plus the
//! pool bookkeeping (eviction, verdict assertions, regathering).

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::blackboard::Blackboard;
use crate::sources::{
    InfoSource, KnowledgeSource, PlaycountSource, SimilarTrackSource, TagSource,
};
use common::{Candidate, Feedback, Hypothesis, SourceId, TrackKey, Verdict};
use data_provider::TrackProvider;

#[derive(Debug, Clone)]
pub struct ArbiterConfig {
    /// Candidates gathered when a seed is loaded or accepted.
    pub gather_batch: usize,
    /// Candidates gathered to replace a rejected one.
    pub refill_batch: usize,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            gather_batch: 4,
            refill_batch: 1,
        }
    }
}

pub struct Arbiter {
    board: Blackboard,
    config: ArbiterConfig,
    info: InfoSource,
    similar: SimilarTrackSource,
    tags: TagSource,
    playcount: PlaycountSource,
}

impl Arbiter {
    pub fn new(provider: Arc<dyn TrackProvider>) -> Self {
        Self::with_config(provider, ArbiterConfig::default())
    }

    pub fn with_config(provider: Arc<dyn TrackProvider>, config: ArbiterConfig) -> Self {
        Self {
            board: Blackboard::new(),
            config,
            info: InfoSource::new(provider.clone()),
            similar: SimilarTrackSource::new(provider.clone()),
            tags: TagSource::new(provider),
            playcount: PlaycountSource::new(),
        }
    }

    pub fn board(&self) -> &Blackboard {
        &self.board
    }

    /// Load the user's chosen track as the reference and gather the first
    /// batch of candidates around it.
    pub async fn seed(&mut self, artist: &str, track: &str) -> Result<Candidate> {
        let key = self.info.load(&mut self.board, artist, track).await?;
        self.similar
            .gather(&mut self.board, &key.artist, &key.title, self.config.gather_batch)
            .await?;
        self.board
            .solving_track()
            .cloned()
            .context("reference track missing after load")
    }

    /// Resolve the scoring sources' picks into one recommendation.
    ///
    /// Both pick: the higher score wins, ties favor the playcount source.
    /// One picks: it wins. Neither (or the pool is empty): `None`, the
    /// search is exhausted.
    pub async fn recommend(&mut self) -> Result<Option<Candidate>> {
        if self.board.pool().is_empty() {
            return Ok(None);
        }

        let playcount_pick = self.playcount.choose(&mut self.board);
        let tag_pick = self.tags.choose(&mut self.board).await?;
        debug!(?playcount_pick, ?tag_pick, "arbitrating");

        let winner = match (playcount_pick, tag_pick) {
            (Some(playcount), Some(tags)) => {
                if playcount.score >= tags.score {
                    Some(playcount)
                } else {
                    Some(tags)
                }
            }
            (Some(playcount), None) => Some(playcount),
            (None, Some(tags)) => Some(tags),
            (None, None) => None,
        };

        Ok(winner.and_then(|pick| self.board.candidate(&pick.key).cloned()))
    }

    /// The user liked the recommendation: broadcast the acceptance, restart
    /// the pool from the liked track as the new reference, and gather a
    /// fresh batch around it.
    pub async fn accept(&mut self, key: &TrackKey) -> Result<()> {
        let Some(candidate) = self.board.candidate(key).cloned() else {
            bail!("accepted candidate is not in the pool: {key}");
        };
        info!(track = %key, "recommendation accepted");

        self.notify(&candidate, Feedback::Accepted);
        self.board.clear_pool();

        let id = self.board.record(Hypothesis::assertion(
            candidate.key.clone(),
            candidate.source,
            Verdict::Liked,
        ));
        self.board.set_solving(id, candidate.clone());

        self.similar
            .gather(
                &mut self.board,
                &candidate.key.artist,
                &candidate.key.title,
                self.config.gather_batch,
            )
            .await?;
        Ok(())
    }

    /// The user disliked the recommendation: evict it, assert the verdict,
    /// notify its sources, and refill the pool if the gatherer supplied it.
    pub async fn reject(&mut self, key: &TrackKey) -> Result<()> {
        let Some(candidate) = self.board.evict(key) else {
            bail!("rejected candidate is not in the pool: {key}");
        };
        info!(track = %key, "recommendation rejected");

        self.board.record(Hypothesis::assertion(
            candidate.key.clone(),
            candidate.source,
            Verdict::Disliked,
        ));
        self.notify(&candidate, Feedback::Rejected);

        if candidate.source == SourceId::Similar {
            if let Some(reference) = self.board.solving_track().map(|t| t.key.clone()) {
                self.similar
                    .gather(
                        &mut self.board,
                        &reference.artist,
                        &reference.title,
                        self.config.refill_batch,
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Deliver feedback to every source subscribed to the candidate,
    /// synchronously and in subscription order. The list is snapshotted
    /// up front: delivery never alters the subscriber list itself, and a
    /// callback's mutations are visible only to later subscribers.
    fn notify(&mut self, candidate: &Candidate, feedback: Feedback) {
        for source in candidate.subscribers().to_vec() {
            debug!(track = %candidate.key, %source, ?feedback, "notifying");
            match source {
                SourceId::Info => self.info.on_feedback(&mut self.board, candidate, feedback),
                SourceId::Similar => {
                    self.similar.on_feedback(&mut self.board, candidate, feedback)
                }
                SourceId::Tags => self.tags.on_feedback(&mut self.board, candidate, feedback),
                SourceId::Playcount => {
                    self.playcount.on_feedback(&mut self.board, candidate, feedback)
                }
            }
        }
    }
}
