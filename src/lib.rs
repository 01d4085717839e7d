//! Spaced-repetition flashcard decks.
//!
//! The scheduling core lives in [`flashcards`]; [`config`] loads the
//! scheduler settings and deck location from disk.

pub mod config;
pub mod flashcards;
