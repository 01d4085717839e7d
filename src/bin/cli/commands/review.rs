use std::io;

use anyhow::{Context, Result};

use spaced_lib::flashcards::{SessionOutcome, SessionRunner, SystemClock};

use crate::app::App;
use crate::render::terminal::TerminalPrompt;
use crate::OutputFormat;

pub fn run(app: &App, deck_name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut prompt = TerminalPrompt::new(
        stdin.lock(),
        io::stdout(),
        app.config.scheduler.clone(),
        use_color,
    );

    let mut session = SessionRunner::new(
        &app.store,
        SystemClock,
        rand::thread_rng(),
        app.config.scheduler.clone(),
    );
    let outcome = session
        .run(deck_name, &mut prompt)
        .with_context(|| format!("Review of '{}' could not be saved", deck_name))?;

    match format {
        OutputFormat::Json => {
            let output = match outcome {
                SessionOutcome::DeckEmpty => serde_json::json!({ "outcome": "deckEmpty" }),
                SessionOutcome::NothingDue => serde_json::json!({ "outcome": "nothingDue" }),
                SessionOutcome::Completed { reviewed } => serde_json::json!({
                    "outcome": "completed",
                    "reviewed": reviewed,
                }),
                SessionOutcome::Interrupted { reviewed, remaining } => serde_json::json!({
                    "outcome": "interrupted",
                    "reviewed": reviewed,
                    "remaining": remaining,
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match outcome {
            SessionOutcome::DeckEmpty => {
                println!("Deck '{}' is empty or does not exist.", deck_name);
            }
            SessionOutcome::NothingDue => {
                println!("No cards due for review in '{}' today. Great work!", deck_name);
            }
            SessionOutcome::Completed { reviewed } => {
                println!(
                    "\nReview session complete! {} cards reviewed, progress saved.",
                    reviewed
                );
            }
            SessionOutcome::Interrupted { reviewed, .. } => {
                println!(
                    "\n\nSession interrupted. Your progress so far ({} cards) has been saved.",
                    reviewed
                );
            }
        },
    }

    Ok(())
}
