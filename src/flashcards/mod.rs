//! Flashcard decks and spaced repetition
//!
//! This module provides:
//! - Card model and the four-way recall rating
//! - SM-2 scheduling of a card after each review
//! - Whole-deck persistence behind the `DeckStore` trait
//! - Review sessions that merge results back even when interrupted

pub mod algorithm;
pub mod models;
pub mod session;
pub mod storage;

pub use algorithm::{review_card, review_with_rating, RatingScores, SchedulerConfig};
pub use models::*;
pub use session::{
    merge_updates, select_due, Clock, FixedClock, Progress, PromptResponse, RatingPrompt,
    SessionError, SessionOutcome, SessionRunner, SystemClock,
};
pub use storage::{DeckStore, DeckStoreError, JsonDeckStore};
