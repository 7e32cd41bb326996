//! Tag-affinity scoring

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::blackboard::Blackboard;
use crate::sources::{KnowledgeSource, ScoredPick};
use common::{Candidate, Feedback, SourceId, TrackKey};
use data_provider::TrackProvider;

#[derive(Debug, Clone)]
pub struct TagConfig {
    /// Tags kept per track. The provider's limit parameter is advisory, so
    /// result lists are truncated here regardless.
    pub tag_limit: usize,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self { tag_limit: 19 }
    }
}

/// Scores pool candidates by how many tags they share with the reference.
pub struct TagSource {
    provider: Arc<dyn TrackProvider>,
    config: TagConfig,
}

impl TagSource {
    pub fn new(provider: Arc<dyn TrackProvider>) -> Self {
        Self::with_config(provider, TagConfig::default())
    }

    pub fn with_config(provider: Arc<dyn TrackProvider>, config: TagConfig) -> Self {
        Self { provider, config }
    }

    /// Pick the pool candidate with the largest tag intersection against
    /// the reference. Ties keep the first candidate found, in pool order.
    /// Score is the matched share of the reference's tags, as a percentage.
    ///
    /// Returns `None` when there is nothing to say: empty pool, a reference
    /// without tags, or no candidate matching a single tag.
    pub async fn choose(&mut self, board: &mut Blackboard) -> Result<Option<ScoredPick>> {
        if board.solving_track().is_none() {
            return Ok(None);
        }

        let tags_to_match = match board.solving_track().and_then(|t| t.tags.clone()) {
            Some(tags) => tags,
            None => {
                let key = match board.solving_track() {
                    Some(track) => track.key.clone(),
                    None => return Ok(None),
                };
                let tags = self.fetch_tags(&key).await?;
                if let Some(track) = board.solving_track_mut() {
                    track.tags = Some(tags.clone());
                }
                tags
            }
        };
        if tags_to_match.is_empty() {
            debug!("reference track has no tags to match");
            return Ok(None);
        }

        // Fill in missing tag lists before scoring; fetched tags stay
        // cached on the candidates.
        let untagged: Vec<TrackKey> = board
            .pool()
            .iter()
            .filter(|c| c.tags.is_none())
            .map(|c| c.key.clone())
            .collect();
        for key in untagged {
            let tags = self.fetch_tags(&key).await?;
            if let Some(candidate) = board.candidate_mut(&key) {
                candidate.tags = Some(tags);
            }
        }

        let mut best_count = 0;
        let mut best: Option<TrackKey> = None;
        for candidate in board.pool() {
            let tags = candidate.tags.as_deref().unwrap_or_default();
            let matched = tags_to_match.iter().filter(|t| tags.contains(*t)).count();
            if matched > best_count {
                best_count = matched;
                best = Some(candidate.key.clone());
            }
        }

        let Some(key) = best else {
            debug!("no candidate shares a tag with the reference");
            return Ok(None);
        };
        let score = best_count as f64 / tags_to_match.len() as f64 * 100.0;
        debug!(track = %key, matched = best_count, score, "tag match chosen");

        board.adopt_assumption(SourceId::Tags, &key, "Closest match on tags", Some(score));
        Ok(Some(ScoredPick { key, score }))
    }

    async fn fetch_tags(&self, key: &TrackKey) -> Result<Vec<String>> {
        let mut tags = self
            .provider
            .top_tags(&key.artist, &key.title, self.config.tag_limit)
            .await?;
        tags.truncate(self.config.tag_limit);
        Ok(tags)
    }
}

impl KnowledgeSource for TagSource {
    fn id(&self) -> SourceId {
        SourceId::Tags
    }

    /// Any feedback invalidates the standing claim; the next `choose`
    /// re-derives it from scratch.
    fn on_feedback(&mut self, board: &mut Blackboard, _candidate: &Candidate, _feedback: Feedback) {
        board.resign(SourceId::Tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Hypothesis, Verdict};
    use data_provider::{StaticProvider, TrackInfo};

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn seeded_board(reference_tags: Option<&[&str]>) -> Blackboard {
        let mut board = Blackboard::new();
        let key = TrackKey::new("Pulp", "Common People");
        let mut reference = Candidate::new(key.clone(), SourceId::Info);
        reference.tags = reference_tags.map(tags);
        let id = board.record(Hypothesis::assertion(key, SourceId::Info, Verdict::Initial));
        board.set_solving(id, reference);
        board
    }

    fn pool_candidate(board: &mut Blackboard, artist: &str, title: &str, candidate_tags: &[&str]) {
        let mut candidate = Candidate::new(TrackKey::new(artist, title), SourceId::Similar);
        candidate.tags = Some(tags(candidate_tags));
        board.admit(candidate).unwrap();
    }

    #[tokio::test]
    async fn largest_intersection_wins_with_fractional_score() {
        let mut board = seeded_board(Some(&["a", "b", "c"]));
        pool_candidate(&mut board, "Blur", "Song 2", &["a", "b"]);
        pool_candidate(&mut board, "Suede", "Animal Nitrate", &["a"]);

        let mut source = TagSource::new(Arc::new(StaticProvider::new()));
        let pick = source.choose(&mut board).await.unwrap().unwrap();

        assert_eq!(pick.key, TrackKey::new("Blur", "Song 2"));
        assert!((pick.score - 66.666_666).abs() < 0.001);

        let assumption = board.assumption_of(SourceId::Tags).unwrap();
        assert_eq!(assumption.candidate, pick.key);
        assert_eq!(assumption.reason, "Closest match on tags");
    }

    #[tokio::test]
    async fn ties_keep_the_first_candidate_found() {
        let mut board = seeded_board(Some(&["a", "b"]));
        pool_candidate(&mut board, "Blur", "Song 2", &["a"]);
        pool_candidate(&mut board, "Suede", "Animal Nitrate", &["b"]);

        let mut source = TagSource::new(Arc::new(StaticProvider::new()));
        let pick = source.choose(&mut board).await.unwrap().unwrap();
        assert_eq!(pick.key, TrackKey::new("Blur", "Song 2"));
    }

    #[tokio::test]
    async fn no_shared_tags_means_no_winner() {
        let mut board = seeded_board(Some(&["a"]));
        pool_candidate(&mut board, "Blur", "Song 2", &["x"]);

        let mut source = TagSource::new(Arc::new(StaticProvider::new()));
        assert!(source.choose(&mut board).await.unwrap().is_none());
        assert!(board.assumption_of(SourceId::Tags).is_none());
    }

    #[tokio::test]
    async fn missing_tags_are_fetched_once_and_truncated() {
        let reference = TrackKey::new("Pulp", "Common People");
        let candidate_key = TrackKey::new("Blur", "Song 2");
        let many: Vec<String> = (0..30).map(|i| format!("tag{i}")).collect();
        let provider = Arc::new(
            StaticProvider::new()
                .with_track(TrackInfo::new("Pulp", "Common People"))
                .with_tags(reference.clone(), many)
                .with_tags(candidate_key.clone(), tags(&["tag0", "tag1"])),
        );

        let mut board = seeded_board(None);
        let mut candidate = Candidate::new(candidate_key.clone(), SourceId::Similar);
        candidate.tags = None;
        board.admit(candidate).unwrap();

        let mut source = TagSource::new(provider.clone());
        let pick = source.choose(&mut board).await.unwrap().unwrap();
        assert_eq!(pick.key, candidate_key);

        let cached = board.solving_track().unwrap().tags.as_ref().unwrap();
        assert_eq!(cached.len(), 19, "client-side truncation");
        // 2 matched of 19 reference tags
        assert!((pick.score - 2.0 / 19.0 * 100.0).abs() < 0.001);

        // Both lists are cached now; a second round fetches nothing.
        source.choose(&mut board).await.unwrap();
        assert_eq!(provider.calls("top_tags"), 2);
    }

    #[tokio::test]
    async fn feedback_always_resigns_the_standing_claim() {
        let mut board = seeded_board(Some(&["a"]));
        pool_candidate(&mut board, "Blur", "Song 2", &["a"]);

        let mut source = TagSource::new(Arc::new(StaticProvider::new()));
        source.choose(&mut board).await.unwrap().unwrap();
        assert!(board.assumption_of(SourceId::Tags).is_some());

        let candidate = board.candidate(&TrackKey::new("Blur", "Song 2")).unwrap().clone();
        source.on_feedback(&mut board, &candidate, Feedback::Rejected);
        assert!(board.assumption_of(SourceId::Tags).is_none());

        // Only its own claim is gone; the assertion log is untouched.
        assert!(board.hypotheses().iter().all(|h| h.source != SourceId::Tags));
        assert_eq!(board.hypotheses().len(), 1);
    }
}
