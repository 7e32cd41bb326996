use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use common::Feedback;
use data_provider::{LastFmClient, LastFmConfig};
use recommendation_engine::{console, Arbiter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = LastFmConfig::from_env()?;
    let provider = Arc::new(LastFmClient::new(config));
    let mut arbiter = Arbiter::new(provider);

    let (artist, track) = console::prompt_seed()?;
    println!("Working...");
    println!("    ~ getting similar artists and songs...");
    arbiter.seed(&artist, &track).await?;
    println!("    ~ evaluating...");

    loop {
        let pick = arbiter.recommend().await?;
        console::show_board(arbiter.board());
        let Some(pick) = pick else {
            console::announce_exhausted();
            break;
        };

        match console::present_candidate(&pick)? {
            Feedback::Accepted => {
                if console::ask_another()? {
                    arbiter.accept(&pick.key).await?;
                    println!("    ~ evaluating...");
                } else {
                    console::announce_session_end();
                    break;
                }
            }
            Feedback::Rejected => {
                println!("Okay, I'll find another recommendation.");
                arbiter.reject(&pick.key).await?;
                println!("Working...");
            }
        }
    }

    Ok(())
}
