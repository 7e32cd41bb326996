//! Playcount scoring
//!
//! Scores pool candidates by how their play counts sit relative to the
//! reference track, under a strategy the source adapts as the user rejects
//! its picks: start at the closest count, escalate outward through "a lot
//! more"/"more" (or the fewer-side twins), and fall back to closest when a
//! strategy has nothing to offer.

use std::fmt;

use tracing::{debug, info};

use crate::blackboard::Blackboard;
use crate::sources::{KnowledgeSource, ScoredPick};
use common::{Candidate, Feedback, SourceId};

/// How the source relates a candidate's play count to the reference's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Closest,
    More,
    MuchMore,
    Fewer,
    MuchFewer,
}

impl Strategy {
    /// The related strategy tried when this one has no candidate.
    fn paired(self) -> Option<Strategy> {
        match self {
            Strategy::More => Some(Strategy::MuchMore),
            Strategy::MuchMore => Some(Strategy::More),
            Strategy::Fewer => Some(Strategy::MuchFewer),
            Strategy::MuchFewer => Some(Strategy::Fewer),
            Strategy::Closest => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Strategy::Closest => "closest playcount",
            Strategy::More => "more plays",
            Strategy::MuchMore => "a lot more plays",
            Strategy::Fewer => "fewer plays",
            Strategy::MuchFewer => "a lot fewer plays",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceQuality {
    Good,
    Poor,
}

/// One running best per strategy bucket.
#[derive(Debug, Clone, Copy)]
struct Slot {
    delta: i64,
    pick: Option<usize>,
    score: f64,
}

impl Slot {
    fn empty(delta: i64) -> Self {
        Self {
            delta,
            pick: None,
            score: 0.0,
        }
    }
}

pub struct PlaycountSource {
    try_this: Option<Strategy>,
    quality: Option<SourceQuality>,
    /// Escalation queues, consumed from the back on rejection: the extreme
    /// strategy is tried first, its milder twin after.
    more_strategies: Vec<Strategy>,
    fewer_strategies: Vec<Strategy>,
}

impl Default for PlaycountSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaycountSource {
    pub fn new() -> Self {
        let (more_strategies, fewer_strategies) = Self::seed_queues();
        Self {
            try_this: None,
            quality: None,
            more_strategies,
            fewer_strategies,
        }
    }

    fn seed_queues() -> (Vec<Strategy>, Vec<Strategy>) {
        (
            vec![Strategy::More, Strategy::MuchMore],
            vec![Strategy::Fewer, Strategy::MuchFewer],
        )
    }

    fn reseed_queues(&mut self) {
        let (more, fewer) = Self::seed_queues();
        self.more_strategies = more;
        self.fewer_strategies = fewer;
    }

    /// Pick the pool candidate the current strategy favors.
    ///
    /// One pass tracks five buckets: the closest count, the extremes in
    /// both directions, and the nearest candidate on either side of the
    /// running closest (fed by displacement: a new closest reclassifies the
    /// previous one by the side it falls on). Returns `None` only when the
    /// pool is empty or no reference is loaded.
    pub fn choose(&mut self, board: &mut Blackboard) -> Option<ScoredPick> {
        if board.pool().is_empty() {
            return None;
        }
        let reference = board.solving_track()?.playcount as i64;
        if reference == 0 {
            debug!("reference track has no play count to compare against");
            return None;
        }

        let mut closest = Slot::empty(i64::MAX);
        let mut much_more = Slot::empty(i64::MIN);
        let mut much_fewer = Slot::empty(i64::MAX);
        let mut more = Slot::empty(i64::MAX);
        let mut fewer = Slot::empty(i64::MIN);

        for (index, song) in board.pool().iter().enumerate() {
            let delta = song.playcount as i64 - reference;
            let pct = (delta as f64 / reference as f64 * 100.0).abs();

            if delta.abs() < closest.delta.abs() {
                // Displacing the running closest: it stays interesting as
                // the nearest candidate on its side of the new one.
                if closest.delta > delta {
                    more = closest;
                } else if closest.delta < delta {
                    fewer = closest;
                }
                closest = Slot {
                    delta,
                    pick: Some(index),
                    score: 100.0 - pct,
                };
            }
            if delta > 0 && delta > much_more.delta {
                much_more = Slot {
                    delta,
                    pick: Some(index),
                    score: pct,
                };
            }
            if delta < 0 && delta < much_fewer.delta {
                much_fewer = Slot {
                    delta,
                    pick: Some(index),
                    score: pct,
                };
            }
            if delta > 0 && delta < more.delta && delta > closest.delta {
                more = Slot {
                    delta,
                    pick: Some(index),
                    score: 100.0 - pct,
                };
            }
            if delta < 0 && delta > fewer.delta && delta < closest.delta {
                fewer = Slot {
                    delta,
                    pick: Some(index),
                    score: 100.0 - pct,
                };
            }
        }

        let strategy = self.try_this.unwrap_or(Strategy::Closest);
        self.try_this = Some(strategy);

        let slot_for = |s: Strategy| match s {
            Strategy::Closest => closest,
            Strategy::More => more,
            Strategy::MuchMore => much_more,
            Strategy::Fewer => fewer,
            Strategy::MuchFewer => much_fewer,
        };

        // Empty preferred bucket: fall back to the paired strategy, then to
        // closest if that is empty too. A non-empty pool always fills the
        // closest bucket.
        let mut chosen = slot_for(strategy);
        if chosen.pick.is_none() {
            if let Some(paired) = strategy.paired() {
                let fallback = slot_for(paired);
                if fallback.pick.is_some() {
                    debug!(from = %strategy, to = %paired, "strategy bucket empty, using pair");
                    self.try_this = Some(paired);
                    chosen = fallback;
                } else {
                    debug!(from = %strategy, "both directional buckets empty, back to closest");
                    self.try_this = Some(Strategy::Closest);
                    chosen = slot_for(Strategy::Closest);
                }
            }
        }

        let index = chosen.pick?;
        let mut score = chosen.score;
        match self.quality {
            Some(SourceQuality::Good) => score *= 1.25,
            Some(SourceQuality::Poor) => score *= 0.75,
            None => {}
        }

        let key = board.pool()[index].key.clone();
        let strategy = self.try_this.unwrap_or(Strategy::Closest);
        debug!(track = %key, %strategy, score, "playcount match chosen");
        board.adopt_assumption(
            SourceId::Playcount,
            &key,
            format!("Try {strategy}"),
            Some(score),
        );
        Some(ScoredPick { key, score })
    }
}

impl KnowledgeSource for PlaycountSource {
    fn id(&self) -> SourceId {
        SourceId::Playcount
    }

    fn on_feedback(&mut self, board: &mut Blackboard, candidate: &Candidate, feedback: Feedback) {
        match feedback {
            Feedback::Accepted => {
                self.quality = Some(SourceQuality::Good);
                self.reseed_queues();
            }
            Feedback::Rejected => {
                board.resign(SourceId::Playcount);
                let reference = board.solving_track().map(|t| t.playcount).unwrap_or(0);
                self.try_this = if candidate.playcount < reference {
                    self.more_strategies.pop()
                } else {
                    self.fewer_strategies.pop()
                };
                if self.try_this.is_none() {
                    info!("all playcount strategies rejected, scoring penalty applied");
                    self.quality = Some(SourceQuality::Poor);
                    self.reseed_queues();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Hypothesis, TrackKey, Verdict};

    fn seeded_board(reference_playcount: u64, pool: &[(&str, u64)]) -> Blackboard {
        let mut board = Blackboard::new();
        let key = TrackKey::new("Pulp", "Common People");
        let mut reference = Candidate::new(key.clone(), SourceId::Info);
        reference.playcount = reference_playcount;
        let id = board.record(Hypothesis::assertion(key, SourceId::Info, Verdict::Initial));
        board.set_solving(id, reference);

        for (title, playcount) in pool {
            let mut candidate = Candidate::new(TrackKey::new("Various", *title), SourceId::Similar);
            candidate.playcount = *playcount;
            board.admit(candidate).unwrap();
        }
        board
    }

    fn rejected(playcount: u64) -> Candidate {
        let mut candidate = Candidate::new(TrackKey::new("Various", "Rejected"), SourceId::Similar);
        candidate.playcount = playcount;
        candidate
    }

    #[test]
    fn default_strategy_picks_the_closest_count() {
        let mut board = seeded_board(100, &[("a", 90), ("b", 150), ("c", 200)]);
        let mut source = PlaycountSource::new();

        let pick = source.choose(&mut board).unwrap();
        assert_eq!(pick.key, TrackKey::new("Various", "a"));
        assert!((pick.score - 90.0).abs() < f64::EPSILON);

        let assumption = board.assumption_of(SourceId::Playcount).unwrap();
        assert_eq!(assumption.reason, "Try closest playcount");
    }

    #[test]
    fn escalation_after_rejection_picks_the_extreme() {
        let mut board = seeded_board(100, &[("a", 90), ("b", 150), ("c", 200)]);
        let mut source = PlaycountSource::new();
        source.choose(&mut board);

        // Rejecting a below-reference pick escalates on the more side.
        source.on_feedback(&mut board, &rejected(90), Feedback::Rejected);
        let pick = source.choose(&mut board).unwrap();
        assert_eq!(pick.key, TrackKey::new("Various", "c"));
        assert!((pick.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            board.assumption_of(SourceId::Playcount).unwrap().reason,
            "Try a lot more plays"
        );
    }

    #[test]
    fn empty_bucket_falls_back_to_pair_then_closest() {
        // Everything below the reference: both more-side buckets are empty.
        let mut board = seeded_board(100, &[("a", 40), ("b", 60)]);
        let mut source = PlaycountSource::new();
        source.choose(&mut board);

        source.on_feedback(&mut board, &rejected(40), Feedback::Rejected);
        let pick = source.choose(&mut board).unwrap();
        // MuchMore and More are both empty, so the pick comes from Closest.
        assert_eq!(pick.key, TrackKey::new("Various", "b"));
        assert_eq!(
            board.assumption_of(SourceId::Playcount).unwrap().reason,
            "Try closest playcount"
        );
    }

    #[test]
    fn displaced_closest_feeds_the_near_buckets() {
        let mut board = seeded_board(100, &[("far-more", 150), ("near-more", 120)]);
        let mut source = PlaycountSource::new();
        source.choose(&mut board);

        // Closest is 120; rejecting it (above reference) pops the fewer
        // queue, whose buckets are empty, so MuchFewer -> Fewer -> Closest.
        source.on_feedback(&mut board, &rejected(120), Feedback::Rejected);
        let pick = source.choose(&mut board).unwrap();
        assert_eq!(pick.key, TrackKey::new("Various", "near-more"));

        // A second rejection on the more side reaches the displaced 150.
        source.on_feedback(&mut board, &rejected(40), Feedback::Rejected);
        let pick = source.choose(&mut board).unwrap();
        assert_eq!(pick.key, TrackKey::new("Various", "far-more"));
        assert!((pick.score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn queue_exhaustion_flips_quality_to_poor() {
        let mut board = seeded_board(100, &[("a", 90), ("b", 150)]);
        let mut source = PlaycountSource::new();

        source.choose(&mut board);
        source.on_feedback(&mut board, &rejected(90), Feedback::Rejected); // MuchMore
        source.choose(&mut board);
        source.on_feedback(&mut board, &rejected(90), Feedback::Rejected); // More
        source.choose(&mut board);
        source.on_feedback(&mut board, &rejected(90), Feedback::Rejected); // queue empty

        // Strategy resets to closest and every score carries the penalty.
        let pick = source.choose(&mut board).unwrap();
        assert_eq!(pick.key, TrackKey::new("Various", "a"));
        assert!((pick.score - 90.0 * 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn acceptance_marks_the_source_good() {
        let mut board = seeded_board(100, &[("a", 90)]);
        let mut source = PlaycountSource::new();
        source.choose(&mut board);

        source.on_feedback(&mut board, &rejected(90), Feedback::Accepted);
        let pick = source.choose(&mut board).unwrap();
        assert!((pick.score - 90.0 * 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_pool_yields_no_result() {
        let mut board = seeded_board(100, &[]);
        let mut source = PlaycountSource::new();
        assert!(source.choose(&mut board).is_none());
    }
}
