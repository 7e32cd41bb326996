//! Blackboard recommendation engine
//!
//! The engine coordinates four independent knowledge sources over a shared
//! workspace:
//! - the blackboard owns the candidate pool and the hypothesis log
//! - knowledge sources read the board, contribute scored hypotheses, and
//!   retract their own prior claims when feedback contradicts them
//! - the arbiter resolves the scoring sources' competing picks into one
//!   recommendation per cycle and drives the feedback fan-out

pub mod arbiter;
pub mod blackboard;
pub mod console;
pub mod sources;

pub use arbiter::{Arbiter, ArbiterConfig};
pub use blackboard::{Blackboard, BoardError, Solving};
pub use sources::{
    InfoSource, KnowledgeSource, PlaycountSource, ScoredPick, SimilarConfig, SimilarTrackSource,
    Strategy, TagConfig, TagSource,
};
