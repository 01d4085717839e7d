//! Data models for the flashcard system

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Ease factor given to freshly created cards
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// A flashcard with question (front), answer (back) and its scheduling state.
///
/// Field names follow the on-disk deck format, so decks written by older
/// tools load without conversion. Those decks carry no `id`; one is
/// generated on load and persisted by the next save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub front: String,
    pub back: String,
    /// Earliest day the card is due again
    pub next_review_date: NaiveDate,
    /// Consecutive successful recalls since the last failure
    #[serde(default)]
    pub repetitions: u32,
    /// Current interval in days
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// SM-2 ease factor, never below the configured floor
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
}

fn default_interval() -> u32 {
    1
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl Card {
    /// Create a card that is due immediately
    pub fn new(front: String, back: String, today: NaiveDate, ease_factor: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            front,
            back,
            next_review_date: today,
            repetitions: 0,
            interval: 1,
            ease_factor,
        }
    }

    /// Check if the card is due for review on `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}

/// How well the user recalled a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Complete failure to recall
    Again,
    /// Correct after significant difficulty
    Hard,
    /// Correct with slight hesitation
    Good,
    /// Correct with perfect recall
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Map the keypad choice shown by prompts (1-4) to a rating
    pub fn from_key(key: &str) -> Result<Self, InvalidRating> {
        match key.trim() {
            "1" => Ok(Rating::Again),
            "2" => Ok(Rating::Hard),
            "3" => Ok(Rating::Good),
            "4" => Ok(Rating::Easy),
            other => Err(InvalidRating(other.to_string())),
        }
    }

    pub fn key(self) -> char {
        match self {
            Rating::Again => '1',
            Rating::Hard => '2',
            Rating::Good => '3',
            Rating::Easy => '4',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Rating {
    type Err = InvalidRating;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(rating) = Rating::from_key(s) {
            return Ok(rating);
        }
        Rating::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidRating(s.trim().to_string()))
    }
}

/// Input that does not name one of the four ratings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid rating '{0}': expected 1 (Again), 2 (Hard), 3 (Good) or 4 (Easy)")]
pub struct InvalidRating(pub String);
