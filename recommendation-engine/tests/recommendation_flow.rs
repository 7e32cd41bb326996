//! End-to-end recommendation cycles against canned provider data.

use std::sync::Arc;

use common::{HypothesisKind, TrackKey, Verdict};
use data_provider::{StaticProvider, TrackInfo};
use recommendation_engine::Arbiter;

fn track(artist: &str, name: &str, playcount: u64) -> TrackInfo {
    let mut info = TrackInfo::new(artist, name);
    info.playcount = playcount;
    info
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Seed track with playcount 1000 and tags {rock}; two gatherable
/// candidates: A at 1100 plays tagged rock/pop, B at 500 plays tagged jazz.
fn provider() -> Arc<StaticProvider> {
    Arc::new(
        StaticProvider::new()
            .with_track(track("Pulp", "Common People", 1000))
            .with_tags(TrackKey::new("Pulp", "Common People"), tags(&["rock"]))
            .with_similar(
                "Pulp",
                vec!["Artist A".to_string(), "Artist B".to_string()],
            )
            .with_top_track("Artist A", TrackKey::new("Artist A", "Track A"))
            .with_top_track("Artist B", TrackKey::new("Artist B", "Track B"))
            .with_track(track("Artist A", "Track A", 1100))
            .with_tags(TrackKey::new("Artist A", "Track A"), tags(&["rock", "pop"]))
            .with_track(track("Artist B", "Track B", 500))
            .with_tags(TrackKey::new("Artist B", "Track B"), tags(&["jazz"])),
    )
}

#[tokio::test]
async fn rejecting_the_first_pick_surfaces_the_runner_up() {
    let mut arbiter = Arbiter::new(provider());
    arbiter.seed("Pulp", "Common People").await.unwrap();
    assert_eq!(arbiter.board().pool().len(), 2);

    // The tag match dominates: A shares "rock" with the reference.
    let first = arbiter.recommend().await.unwrap().unwrap();
    assert_eq!(first.key, TrackKey::new("Artist A", "Track A"));

    arbiter.reject(&first.key).await.unwrap();
    assert!(arbiter.board().candidate(&first.key).is_none());
    assert!(arbiter
        .board()
        .hypotheses()
        .iter()
        .any(|h| h.kind == HypothesisKind::Assertion(Verdict::Disliked)
            && h.candidate == first.key));

    // Only B remains; the playcount source carries it alone.
    let second = arbiter.recommend().await.unwrap().unwrap();
    assert_eq!(second.key, TrackKey::new("Artist B", "Track B"));

    arbiter.reject(&second.key).await.unwrap();
    assert!(arbiter.recommend().await.unwrap().is_none(), "search exhausted");
}

#[tokio::test]
async fn accepting_restarts_the_search_from_the_liked_track() {
    let mut arbiter = Arbiter::new(provider());
    arbiter.seed("Pulp", "Common People").await.unwrap();

    let pick = arbiter.recommend().await.unwrap().unwrap();
    arbiter.accept(&pick.key).await.unwrap();

    assert_eq!(arbiter.board().pool().len(), 0, "pool cleared");
    let solving = arbiter.board().solving().unwrap();
    assert_eq!(solving.track.key, pick.key);

    let liked = arbiter
        .board()
        .hypotheses()
        .iter()
        .find(|h| h.kind == HypothesisKind::Assertion(Verdict::Liked))
        .expect("liked assertion recorded");
    assert_eq!(liked.id, solving.hypothesis, "solving tracks the new assertion");
}

#[tokio::test]
async fn a_full_session_settles_every_identity_exactly_once() {
    let mut arbiter = Arbiter::new(provider());
    arbiter.seed("Pulp", "Common People").await.unwrap();

    let mut presented = Vec::new();
    while let Some(pick) = arbiter.recommend().await.unwrap() {
        presented.push(pick.key.clone());
        arbiter.reject(&pick.key).await.unwrap();
    }

    assert_eq!(presented.len(), 2);
    let mut unique = presented.clone();
    unique.dedup();
    assert_eq!(unique, presented, "no identity presented twice");

    // Every presented track ended with a permanent verdict.
    for key in &presented {
        assert!(arbiter
            .board()
            .hypotheses()
            .iter()
            .any(|h| !h.is_retractable() && h.candidate == *key));
    }
}
