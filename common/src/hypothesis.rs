use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::track::{SourceId, TrackKey};

/// Ground truth the user (or the session setup) has established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Initial,
    Liked,
    Disliked,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::Initial => "Initial song",
            Verdict::Liked => "Liked by user",
            Verdict::Disliked => "Disliked by user",
        };
        f.write_str(text)
    }
}

/// Whether a hypothesis may be withdrawn.
///
/// Assumptions are provisional claims a source replaces as evidence changes;
/// assertions are permanent and record a [`Verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HypothesisKind {
    Assumption,
    Assertion(Verdict),
}

/// A claim about a candidate's merit, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub id: Uuid,
    /// Identity of the candidate the claim is about.
    pub candidate: TrackKey,
    /// The source that made the claim.
    pub source: SourceId,
    pub kind: HypothesisKind,
    pub reason: String,
    pub score: Option<f64>,
    pub made_at: DateTime<Utc>,
}

impl Hypothesis {
    /// A retractable claim, optionally scored.
    pub fn assumption(
        candidate: TrackKey,
        source: SourceId,
        reason: impl Into<String>,
        score: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            source,
            kind: HypothesisKind::Assumption,
            reason: reason.into(),
            score,
            made_at: Utc::now(),
        }
    }

    /// A permanent claim recording a verdict.
    pub fn assertion(candidate: TrackKey, source: SourceId, verdict: Verdict) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            source,
            kind: HypothesisKind::Assertion(verdict),
            reason: verdict.to_string(),
            score: None,
            made_at: Utc::now(),
        }
    }

    pub fn is_retractable(&self) -> bool {
        matches!(self.kind, HypothesisKind::Assumption)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self.kind {
            HypothesisKind::Assertion(v) => Some(v),
            HypothesisKind::Assumption => None,
        }
    }
}
