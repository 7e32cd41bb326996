//! Shared domain types for the song recommender
//!
//! This crate holds the data entities every layer agrees on:
//! - Track identity and candidate records placed on the blackboard
//! - The hypothesis model (retractable assumptions, permanent assertions)
//! - Source and feedback enums used by the notification protocol

pub mod hypothesis;
pub mod track;

pub use hypothesis::{Hypothesis, HypothesisKind, Verdict};
pub use track::{Candidate, Feedback, SourceId, TrackKey};
