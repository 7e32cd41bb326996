//! Reference-track loader

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::blackboard::Blackboard;
use crate::sources::KnowledgeSource;
use common::{Candidate, Feedback, Hypothesis, SourceId, TrackKey, Verdict};
use data_provider::{TrackInfo, TrackProvider};

/// Loads full metadata for the user's chosen track and installs it as the
/// reference the whole search is relative to.
pub struct InfoSource {
    provider: Arc<dyn TrackProvider>,
    /// Last lookup, keyed by the requested identity. An immediate repeat
    /// for the same pair must not cost a second external call.
    last_lookup: Option<(TrackKey, TrackInfo)>,
}

impl InfoSource {
    pub fn new(provider: Arc<dyn TrackProvider>) -> Self {
        Self {
            provider,
            last_lookup: None,
        }
    }

    /// Fetch the named track, record the permanent "Initial song" assertion
    /// for it, and make it the board's solving target.
    pub async fn load(
        &mut self,
        board: &mut Blackboard,
        artist: &str,
        track: &str,
    ) -> Result<TrackKey> {
        let requested = TrackKey::new(artist, track);
        let cached = match &self.last_lookup {
            Some((key, cached)) if *key == requested => Some(cached.clone()),
            _ => None,
        };
        let fetched = match cached {
            Some(cached) => {
                debug!(track = %requested, "reusing cached track info");
                cached
            }
            None => {
                let fetched = self.provider.track_info(artist, track).await?;
                self.last_lookup = Some((requested, fetched.clone()));
                fetched
            }
        };

        let mut candidate = fetched.into_candidate(SourceId::Info);
        candidate.subscribe(SourceId::Info);
        let key = candidate.key.clone();

        let id = board.record(Hypothesis::assertion(
            key.clone(),
            SourceId::Info,
            Verdict::Initial,
        ));
        board.set_solving(id, candidate);
        info!(track = %key, "reference track loaded");
        Ok(key)
    }
}

impl KnowledgeSource for InfoSource {
    fn id(&self) -> SourceId {
        SourceId::Info
    }

    /// The seed never competes for the recommendation, so feedback on other
    /// candidates carries no information for it.
    fn on_feedback(&mut self, _board: &mut Blackboard, _candidate: &Candidate, _feedback: Feedback) {
    }
}
