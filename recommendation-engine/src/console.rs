//! Terminal presentation
//!
//! Plain prompt-and-print dialogue: show the board, present one candidate,
//! read a yes/no. The engine never calls in here; the binary's session loop
//! wires the two together.

use std::io::{self, Write};

use common::{Candidate, Feedback};

use crate::blackboard::Blackboard;

pub fn prompt_seed() -> io::Result<(String, String)> {
    println!("Ask me for a recommendation based on a track of your choosing:");
    let artist = prompt("artist: ")?;
    let track = prompt("track: ")?;
    Ok((artist, track))
}

pub fn show_board(board: &Blackboard) {
    println!();
    println!("- - - - - THE BLACKBOARD - - - - -");
    if let Some(track) = board.solving_track() {
        println!("- Find a recommendation based on:");
        println!("- {track}");
    }
    println!("-");
    println!("- Recommendation Pool:");
    for candidate in board.pool() {
        println!("- **** {candidate}");
    }
    println!("-");
    println!("- Assumptions and Assertions:");
    for hypothesis in board.hypotheses() {
        let label = if hypothesis.is_retractable() {
            "Assumption"
        } else {
            "Assertion"
        };
        match hypothesis.score {
            Some(score) => println!(
                "- **** {label}: {}, {} with score of {score:.2} : made by {}",
                hypothesis.candidate, hypothesis.reason, hypothesis.source
            ),
            None => println!(
                "- **** {label}: {}, {} : made by {}",
                hypothesis.candidate, hypothesis.reason, hypothesis.source
            ),
        }
    }
    println!("- - - - - ************** - - - - -");
    println!();
}

pub fn present_candidate(candidate: &Candidate) -> io::Result<Feedback> {
    println!(
        "Do you like \"{}\" by {}?",
        candidate.key.title, candidate.key.artist
    );
    if let Some(url) = &candidate.url {
        println!("Check it out: {url}");
    }
    let answer = prompt("response (yes/No): ")?;
    Ok(if answer.eq_ignore_ascii_case("yes") {
        Feedback::Accepted
    } else {
        Feedback::Rejected
    })
}

/// After an accepted recommendation: keep going?
pub fn ask_another() -> io::Result<bool> {
    println!("Great! Would you like me to make another recommendation?");
    let answer = prompt("response (yes/No): ")?;
    Ok(answer.eq_ignore_ascii_case("yes"))
}

pub fn announce_exhausted() {
    println!("Sorry, but there are no more recommendations to be had.");
}

pub fn announce_session_end() {
    println!("Okay. Goodbye!");
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
