use anyhow::{Context, Result};

use spaced_lib::flashcards::{select_due, Clock, DeckStore, SystemClock};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let names = app.store.list_decks().context("Failed to list decks")?;
    let today = SystemClock.today();

    let mut rows = Vec::new();
    for name in names {
        let cards = app
            .store
            .load(&name)
            .with_context(|| format!("Failed to load deck '{}'", name))?;
        let due = select_due(&cards, today).len();
        rows.push((name, cards.len(), due));
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = rows
                .iter()
                .map(|(name, cards, due)| {
                    serde_json::json!({
                        "name": name,
                        "cardCount": cards,
                        "dueCount": due,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if rows.is_empty() {
                println!("(no decks in {})", app.store.decks_path().display());
            }
            for (name, cards, due) in &rows {
                println!("{} ({} cards, {} due)", name, cards, due);
            }
        }
    }

    Ok(())
}
