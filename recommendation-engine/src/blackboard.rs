//! The shared workspace
//!
//! The blackboard owns the candidate pool (insertion order is display
//! order), the append-ordered hypothesis log, and the distinguished
//! "currently solving" reference all scoring is relative to. Sources never
//! hold references into it; they receive `&mut Blackboard` for the duration
//! of a call and go through the operations here.

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use common::{Candidate, Hypothesis, SourceId, TrackKey};

/// Violations of the workspace rules. These mark programming errors, not
/// recoverable conditions.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("assertions may not be retracted")]
    RetractAssertion,

    #[error("candidate already in the pool: {key}")]
    DuplicateCandidate { key: TrackKey },

    #[error("no such hypothesis: {id}")]
    UnknownHypothesis { id: Uuid },
}

/// The current reference: the most recent assertion, with an owned copy of
/// its track (the reference track is not part of the pool).
#[derive(Debug, Clone)]
pub struct Solving {
    pub hypothesis: Uuid,
    pub track: Candidate,
}

#[derive(Debug, Default)]
pub struct Blackboard {
    pool: Vec<Candidate>,
    log: Vec<Hypothesis>,
    solving: Option<Solving>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live candidates, in admission order.
    pub fn pool(&self) -> &[Candidate] {
        &self.pool
    }

    pub fn candidate(&self, key: &TrackKey) -> Option<&Candidate> {
        self.pool.iter().find(|c| c.key == *key)
    }

    pub fn candidate_mut(&mut self, key: &TrackKey) -> Option<&mut Candidate> {
        self.pool.iter_mut().find(|c| c.key == *key)
    }

    /// Add a candidate to the pool. Callers de-duplicate first; a duplicate
    /// identity is rejected without mutating the pool.
    pub fn admit(&mut self, candidate: Candidate) -> Result<(), BoardError> {
        if self.candidate(&candidate.key).is_some() {
            return Err(BoardError::DuplicateCandidate {
                key: candidate.key.clone(),
            });
        }
        debug!(track = %candidate.key, source = %candidate.source, "admitted to pool");
        self.pool.push(candidate);
        Ok(())
    }

    /// Remove a candidate from the pool, returning it. Dropping the
    /// candidate drops its subscriber list, which is what implicitly
    /// unsubscribes its sources.
    pub fn evict(&mut self, key: &TrackKey) -> Option<Candidate> {
        let index = self.pool.iter().position(|c| c.key == *key)?;
        debug!(track = %key, "evicted from pool");
        Some(self.pool.remove(index))
    }

    /// Evict every candidate (used when an accepted recommendation restarts
    /// the search from a new reference). Returns how many were evicted.
    pub fn clear_pool(&mut self) -> usize {
        let evicted = self.pool.len();
        self.pool.clear();
        evicted
    }

    /// All hypotheses, oldest first. The log is only ever appended to or
    /// shrunk by retraction; it is never reordered.
    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.log
    }

    pub fn record(&mut self, hypothesis: Hypothesis) -> Uuid {
        let id = hypothesis.id;
        debug!(
            track = %hypothesis.candidate,
            source = %hypothesis.source,
            reason = %hypothesis.reason,
            "hypothesis recorded"
        );
        self.log.push(hypothesis);
        id
    }

    /// Withdraw a hypothesis. Assertions are permanent: retracting one is
    /// an invariant violation.
    pub fn retract(&mut self, id: Uuid) -> Result<Hypothesis, BoardError> {
        let index = self
            .log
            .iter()
            .position(|h| h.id == id)
            .ok_or(BoardError::UnknownHypothesis { id })?;
        if !self.log[index].is_retractable() {
            return Err(BoardError::RetractAssertion);
        }
        let hypothesis = self.log.remove(index);
        debug!(track = %hypothesis.candidate, source = %hypothesis.source, "hypothesis retracted");
        Ok(hypothesis)
    }

    /// The source's standing assumption, if it holds one.
    pub fn assumption_of(&self, source: SourceId) -> Option<&Hypothesis> {
        self.log
            .iter()
            .find(|h| h.source == source && h.is_retractable())
    }

    /// Withdraw the source's standing assumption, if any.
    pub fn resign(&mut self, source: SourceId) -> Option<Hypothesis> {
        let id = self.assumption_of(source)?.id;
        // Found via assumption_of, so this is retractable by construction.
        self.retract(id).ok()
    }

    /// Resign-or-reuse: keep the standing assumption when it already targets
    /// `key`, otherwise retract it, record the replacement, and subscribe
    /// the source to the new winner. The old claim is fully withdrawn before
    /// the new one lands, so no observer ever sees two assumptions from the
    /// same source.
    pub fn adopt_assumption(
        &mut self,
        source: SourceId,
        key: &TrackKey,
        reason: impl Into<String>,
        score: Option<f64>,
    ) {
        if let Some(current) = self.assumption_of(source) {
            if current.candidate == *key {
                return;
            }
            self.resign(source);
        }
        self.record(Hypothesis::assumption(key.clone(), source, reason, score));
        self.subscribe(key, source);
    }

    /// Subscribe `source` to the pooled candidate with identity `key`.
    /// Returns false when the candidate is not in the pool.
    pub fn subscribe(&mut self, key: &TrackKey, source: SourceId) -> bool {
        match self.candidate_mut(key) {
            Some(candidate) => {
                candidate.subscribe(source);
                true
            }
            None => false,
        }
    }

    /// Whether this identity has already been considered: present in the
    /// pool, or the subject of any assertion (the seed, an accepted track,
    /// or a rejected one). The gatherer's de-duplication set.
    pub fn considered(&self, key: &TrackKey) -> bool {
        self.pool.iter().any(|c| c.key == *key)
            || self
                .log
                .iter()
                .any(|h| !h.is_retractable() && h.candidate == *key)
    }

    pub fn set_solving(&mut self, hypothesis: Uuid, track: Candidate) {
        self.solving = Some(Solving { hypothesis, track });
    }

    pub fn solving(&self) -> Option<&Solving> {
        self.solving.as_ref()
    }

    /// The reference track, if a seed has been loaded.
    pub fn solving_track(&self) -> Option<&Candidate> {
        self.solving.as_ref().map(|s| &s.track)
    }

    /// Mutable access to the reference track (tag caching writes here).
    pub fn solving_track_mut(&mut self) -> Option<&mut Candidate> {
        self.solving.as_mut().map(|s| &mut s.track)
    }
}
