//! Storage operations for decks
//!
//! Each deck is one JSON file holding an array of cards:
//! ```text
//! decks/
//! ├── spanish.json
//! └── rust.json
//! ```
//! Decks are always read and written whole.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use super::algorithm::SchedulerConfig;
use super::models::Card;

#[derive(Error, Debug)]
pub enum DeckStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid deck name: {0:?}")]
    InvalidDeckName(String),
}

pub type Result<T> = std::result::Result<T, DeckStoreError>;

/// Whole-collection load/save of named decks
pub trait DeckStore {
    /// Load every card of a deck. A deck that does not exist yet is empty.
    fn load(&self, deck_name: &str) -> Result<Vec<Card>>;

    /// Replace the stored deck with `cards`, creating it if needed
    fn save(&self, deck_name: &str, cards: &[Card]) -> Result<()>;

    /// Append a new card with default scheduling state and persist the deck
    fn add_card(
        &self,
        deck_name: &str,
        front: String,
        back: String,
        today: NaiveDate,
        config: &SchedulerConfig,
    ) -> Result<Card> {
        let mut cards = self.load(deck_name)?;
        let card = Card::new(front, back, today, config.initial_ease_factor);
        cards.push(card.clone());
        self.save(deck_name, &cards)?;

        log::info!("Added card {} to deck '{}'", card.id, deck_name);
        Ok(card)
    }
}

/// Deck store backed by one pretty-printed JSON file per deck
pub struct JsonDeckStore {
    /// Directory holding the deck files (e.g., ~/.local/share/spaced/decks)
    decks_path: PathBuf,
}

impl JsonDeckStore {
    pub fn new(decks_path: PathBuf) -> Self {
        Self { decks_path }
    }

    pub fn decks_path(&self) -> &Path {
        &self.decks_path
    }

    /// Get the file path for a deck
    fn deck_path(&self, deck_name: &str) -> Result<PathBuf> {
        validate_deck_name(deck_name)?;
        Ok(self.decks_path.join(format!("{}.json", deck_name)))
    }

    /// List the names of all stored decks
    pub fn list_decks(&self) -> Result<Vec<String>> {
        if !self.decks_path.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.decks_path)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

impl DeckStore for JsonDeckStore {
    fn load(&self, deck_name: &str) -> Result<Vec<Card>> {
        let path = self.deck_path(deck_name)?;
        if !path.exists() {
            log::debug!("Deck '{}' not found at {:?}, treating as empty", deck_name, path);
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let cards: Vec<Card> = serde_json::from_str(&content)?;
        Ok(cards)
    }

    fn save(&self, deck_name: &str, cards: &[Card]) -> Result<()> {
        let path = self.deck_path(deck_name)?;
        fs::create_dir_all(&self.decks_path)?;
        fs::write(&path, serde_json::to_string_pretty(cards)?)?;

        log::info!("Saved {} cards to deck '{}'", cards.len(), deck_name);
        Ok(())
    }
}

/// Deck names become file names, so they must stay inside the deck directory
fn validate_deck_name(deck_name: &str) -> Result<()> {
    let invalid = deck_name.trim().is_empty()
        || deck_name.starts_with('.')
        || deck_name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(DeckStoreError::InvalidDeckName(deck_name.to_string()));
    }
    Ok(())
}
