use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use spaced_lib::flashcards::{Clock, DeckStore, SystemClock};

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    deck_name: &str,
    front: Option<String>,
    back: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let front = match front {
        Some(text) => text,
        None => read_side(&mut input, "Enter front of card (question): ")?,
    };
    let back = match back {
        Some(text) => text,
        None => read_side(&mut input, "Enter back of card (answer): ")?,
    };

    let card = app
        .store
        .add_card(deck_name, front, back, SystemClock.today(), &app.config.scheduler)
        .with_context(|| format!("Failed to add card to '{}'", deck_name))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Card added to '{}'.", deck_name);
        }
    }

    Ok(())
}

/// Prompt for one side of a card. End of input cancels card creation.
fn read_side(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Card creation cancelled");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
