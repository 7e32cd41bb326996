//! Knowledge sources
//!
//! Four independent units of reasoning over the blackboard:
//! - [`InfoSource`] loads the reference track the search starts from
//! - [`SimilarTrackSource`] keeps the pool supplied with external candidates
//! - [`TagSource`] scores candidates by tag overlap with the reference
//! - [`PlaycountSource`] scores candidates by play count, with a strategy
//!   state machine that adapts to rejections
//!
//! Sources are decoupled: none calls another, and each learns about user
//! feedback only through the notification fan-out on candidates it
//! subscribed to.

use serde::{Deserialize, Serialize};

use crate::blackboard::Blackboard;
use common::{Candidate, Feedback, SourceId, TrackKey};

pub mod info;
pub mod playcount;
pub mod similar;
pub mod tags;

pub use info::InfoSource;
pub use playcount::{PlaycountSource, Strategy};
pub use similar::{SimilarConfig, SimilarTrackSource};
pub use tags::{TagConfig, TagSource};

/// A scoring source's best candidate for the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPick {
    pub key: TrackKey,
    pub score: f64,
}

/// Capability interface every knowledge source implements.
///
/// `on_feedback` is the notification callback: the engine delivers user
/// feedback on a candidate to its subscribed sources, synchronously and in
/// subscription order. The two scoring sources additionally expose `choose`
/// as inherent methods; the arbiter holds them explicitly because the
/// arbitration policy is specific to exactly those two.
pub trait KnowledgeSource {
    fn id(&self) -> SourceId;

    fn on_feedback(&mut self, board: &mut Blackboard, candidate: &Candidate, feedback: Feedback);
}
