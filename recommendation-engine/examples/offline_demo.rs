//! Scripted recommendation session against canned data.
//!
//! Runs the full engine with no network or API key: seeds a reference
//! track, then rejects picks until the search is exhausted, printing the
//! board between cycles.
//!
//! Run with: cargo run -p recommendation-engine --example offline_demo

use std::sync::Arc;

use common::TrackKey;
use data_provider::{StaticProvider, TrackInfo};
use recommendation_engine::{console, Arbiter};

fn track(artist: &str, name: &str, playcount: u64, listeners: u64) -> TrackInfo {
    let mut info = TrackInfo::new(artist, name);
    info.playcount = playcount;
    info.listeners = listeners;
    info
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let provider = Arc::new(
        StaticProvider::new()
            .with_track(track("Pulp", "Common People", 5_144_798, 841_920))
            .with_tags(
                TrackKey::new("Pulp", "Common People"),
                tags(&["britpop", "90s", "rock"]),
            )
            .with_similar(
                "Pulp",
                vec![
                    "Blur".to_string(),
                    "Suede".to_string(),
                    "Elastica".to_string(),
                    "Supergrass".to_string(),
                ],
            )
            .with_top_track("Blur", TrackKey::new("Blur", "Song 2"))
            .with_track(track("Blur", "Song 2", 9_212_884, 1_539_557))
            .with_tags(TrackKey::new("Blur", "Song 2"), tags(&["britpop", "rock"]))
            .with_top_track("Suede", TrackKey::new("Suede", "Animal Nitrate"))
            .with_track(track("Suede", "Animal Nitrate", 1_502_338, 301_877))
            .with_tags(
                TrackKey::new("Suede", "Animal Nitrate"),
                tags(&["britpop", "glam rock"]),
            )
            .with_top_track("Elastica", TrackKey::new("Elastica", "Connection"))
            .with_track(track("Elastica", "Connection", 2_904_548, 541_233))
            .with_tags(TrackKey::new("Elastica", "Connection"), tags(&["punk", "90s"]))
            .with_top_track("Supergrass", TrackKey::new("Supergrass", "Alright"))
            .with_track(track("Supergrass", "Alright", 3_713_553, 645_281))
            .with_tags(TrackKey::new("Supergrass", "Alright"), tags(&["britpop"])),
    );

    let mut arbiter = Arbiter::new(provider);
    println!("Seeding from Pulp - Common People...");
    arbiter.seed("Pulp", "Common People").await?;

    while let Some(pick) = arbiter.recommend().await? {
        console::show_board(arbiter.board());
        println!("Engine suggests: {}", pick.key);
        println!("(scripted session rejects everything)\n");
        arbiter.reject(&pick.key).await?;
    }

    console::show_board(arbiter.board());
    console::announce_exhausted();
    Ok(())
}
