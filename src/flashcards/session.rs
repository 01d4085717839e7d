//! Review sessions
//!
//! A session walks the due cards of one deck in random order, asks a
//! [`RatingPrompt`] for each rating, and writes the results back. The deck
//! is saved whether the walk finishes or the prompt cancels part way, so
//! reviews already answered are never lost.
//!
//! ```text
//! Loading -> Selecting -> Reviewing(n) -> Completed | Interrupted -> Persisted
//! ```

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use super::algorithm::{review_with_rating, SchedulerConfig};
use super::models::{Card, Rating};
use super::storage::{DeckStore, DeckStoreError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to access deck '{deck}': {source}")]
    Store {
        deck: String,
        #[source]
        source: DeckStoreError,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Source of "today" for scheduling
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date from the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Position of the card being presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the current card
    pub current: usize,
    pub total: usize,
}

/// What the prompt answered for one card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResponse {
    Rated(Rating),
    /// The user aborted the session
    Cancelled,
}

/// Presents a card and blocks until the user rates it or cancels.
///
/// Implementations handle their own re-prompting; only valid ratings
/// reach the session.
pub trait RatingPrompt {
    fn ask_rating(&mut self, card: &Card, progress: Progress) -> PromptResponse;
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The deck has no cards (or does not exist); nothing was saved
    DeckEmpty,
    /// No card is due today; nothing was saved
    NothingDue,
    /// Every due card was reviewed and the deck saved
    Completed { reviewed: usize },
    /// The prompt cancelled; reviews so far were saved
    Interrupted { reviewed: usize, remaining: usize },
}

/// Cards due on `today`, in deck order
pub fn select_due(deck: &[Card], today: NaiveDate) -> Vec<&Card> {
    deck.iter().filter(|card| card.is_due(today)).collect()
}

/// Replace cards in `deck` by their reviewed versions, matching on id.
///
/// Cards without an update keep their state and position.
pub fn merge_updates(deck: &[Card], updated: &[Card]) -> Vec<Card> {
    let by_id: HashMap<Uuid, &Card> = updated.iter().map(|card| (card.id, card)).collect();

    deck.iter()
        .map(|card| by_id.get(&card.id).map_or_else(|| card.clone(), |&u| u.clone()))
        .collect()
}

/// Runs review sessions against a deck store
pub struct SessionRunner<'a, S, C, R> {
    store: &'a S,
    clock: C,
    rng: R,
    config: SchedulerConfig,
}

impl<'a, S, C, R> SessionRunner<'a, S, C, R>
where
    S: DeckStore,
    C: Clock,
    R: Rng,
{
    pub fn new(store: &'a S, clock: C, rng: R, config: SchedulerConfig) -> Self {
        Self {
            store,
            clock,
            rng,
            config,
        }
    }

    /// Review every due card of `deck_name`, then merge and save.
    ///
    /// A cancelled prompt is a normal [`SessionOutcome::Interrupted`]; only
    /// load or save failures are errors.
    pub fn run<P: RatingPrompt>(&mut self, deck_name: &str, prompt: &mut P) -> Result<SessionOutcome> {
        let store_err = |source| SessionError::Store {
            deck: deck_name.to_string(),
            source,
        };

        log::debug!("Session '{}': loading", deck_name);
        let deck = self.store.load(deck_name).map_err(store_err)?;
        if deck.is_empty() {
            return Ok(SessionOutcome::DeckEmpty);
        }

        let today = self.clock.today();
        log::debug!("Session '{}': selecting due cards for {}", deck_name, today);
        let mut due: Vec<Card> = select_due(&deck, today).into_iter().cloned().collect();
        if due.is_empty() {
            return Ok(SessionOutcome::NothingDue);
        }
        due.shuffle(&mut self.rng);

        let total = due.len();
        log::info!("Starting review of '{}' ({} cards due)", deck_name, total);

        let mut updated = Vec::with_capacity(total);
        let mut cancelled = false;
        for (index, card) in due.iter().enumerate() {
            let progress = Progress {
                current: index + 1,
                total,
            };
            match prompt.ask_rating(card, progress) {
                PromptResponse::Rated(rating) => {
                    updated.push(review_with_rating(card, rating, today, &self.config));
                }
                PromptResponse::Cancelled => {
                    cancelled = true;
                    break;
                }
            }
        }

        let reviewed = updated.len();
        let outcome = if cancelled {
            log::warn!(
                "Review of '{}' interrupted after {} of {} cards",
                deck_name,
                reviewed,
                total
            );
            SessionOutcome::Interrupted {
                reviewed,
                remaining: total - reviewed,
            }
        } else {
            SessionOutcome::Completed { reviewed }
        };

        let merged = merge_updates(&deck, &updated);
        self.store.save(deck_name, &merged).map_err(store_err)?;
        log::debug!("Session '{}': persisted ({:?})", deck_name, outcome);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::storage::JsonDeckStore;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// In-memory store that can be told to fail on save
    #[derive(Default)]
    struct MemoryStore {
        decks: RefCell<HashMap<String, Vec<Card>>>,
        fail_save: bool,
        saves: RefCell<usize>,
    }

    impl DeckStore for MemoryStore {
        fn load(&self, deck_name: &str) -> std::result::Result<Vec<Card>, DeckStoreError> {
            Ok(self.decks.borrow().get(deck_name).cloned().unwrap_or_default())
        }

        fn save(&self, deck_name: &str, cards: &[Card]) -> std::result::Result<(), DeckStoreError> {
            if self.fail_save {
                return Err(DeckStoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            *self.saves.borrow_mut() += 1;
            self.decks.borrow_mut().insert(deck_name.to_string(), cards.to_vec());
            Ok(())
        }
    }

    /// Answers from a script, cancelling once it runs out
    struct ScriptedPrompt {
        answers: VecDeque<PromptResponse>,
        seen: Vec<(Uuid, Progress)>,
    }

    impl ScriptedPrompt {
        fn new(answers: impl IntoIterator<Item = PromptResponse>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                seen: Vec::new(),
            }
        }

        fn rating(rating: Rating, count: usize) -> Self {
            Self::new(std::iter::repeat(PromptResponse::Rated(rating)).take(count))
        }
    }

    impl RatingPrompt for ScriptedPrompt {
        fn ask_rating(&mut self, card: &Card, progress: Progress) -> PromptResponse {
            self.seen.push((card.id, progress));
            self.answers.pop_front().unwrap_or(PromptResponse::Cancelled)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn card(front: &str, due: NaiveDate) -> Card {
        Card::new(front.to_string(), format!("{} answer", front), due, 2.5)
    }

    /// Three due cards (one overdue) and one due tomorrow
    fn sample_deck() -> Vec<Card> {
        vec![
            card("a", today()),
            card("b", today() + Duration::days(1)),
            card("c", today() - Duration::days(1)),
            card("d", today()),
        ]
    }

    fn runner(store: &MemoryStore, seed: u64) -> SessionRunner<'_, MemoryStore, FixedClock, StdRng> {
        SessionRunner::new(
            store,
            FixedClock(today()),
            StdRng::seed_from_u64(seed),
            SchedulerConfig::default(),
        )
    }

    fn store_with(deck: Vec<Card>) -> MemoryStore {
        let store = MemoryStore::default();
        store.decks.borrow_mut().insert("deck".to_string(), deck);
        store
    }

    #[test]
    fn test_select_due() {
        let deck = sample_deck();
        let due: Vec<&str> = select_due(&deck, today())
            .into_iter()
            .map(|c| c.front.as_str())
            .collect();

        assert_eq!(due, vec!["a", "c", "d"]);
        assert_eq!(select_due(&deck, today() + Duration::days(1)).len(), 4);
        assert!(select_due(&deck, today() - Duration::days(2)).is_empty());
    }

    #[test]
    fn test_merge_keeps_order_and_untouched_cards() {
        let deck = sample_deck();
        let mut reviewed = deck[2].clone();
        reviewed.repetitions = 1;
        reviewed.next_review_date = today() + Duration::days(1);

        let merged = merge_updates(&deck, &[reviewed.clone()]);

        assert_eq!(merged.len(), deck.len());
        assert_eq!(merged[0], deck[0]);
        assert_eq!(merged[1], deck[1]);
        assert_eq!(merged[2], reviewed);
        assert_eq!(merged[3], deck[3]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let deck = sample_deck();
        let config = SchedulerConfig::default();
        let updated: Vec<Card> = select_due(&deck, today())
            .into_iter()
            .map(|c| review_with_rating(c, Rating::Good, today(), &config))
            .collect();

        let once = merge_updates(&deck, &updated);
        let twice = merge_updates(&once, &updated);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_distinguishes_duplicate_content() {
        let first = card("same", today());
        let second = card("same", today());
        let mut reviewed = first.clone();
        reviewed.repetitions = 1;

        let merged = merge_updates(&[first, second.clone()], &[reviewed.clone()]);

        assert_eq!(merged, vec![reviewed, second]);
    }

    #[test]
    fn test_empty_deck() {
        let store = MemoryStore::default();
        let mut prompt = ScriptedPrompt::new([]);

        let outcome = runner(&store, 1).run("missing", &mut prompt).unwrap();

        assert_eq!(outcome, SessionOutcome::DeckEmpty);
        assert!(prompt.seen.is_empty());
        assert_eq!(*store.saves.borrow(), 0);
    }

    #[test]
    fn test_nothing_due() {
        let store = store_with(vec![card("later", today() + Duration::days(3))]);
        let mut prompt = ScriptedPrompt::new([]);

        let outcome = runner(&store, 1).run("deck", &mut prompt).unwrap();

        assert_eq!(outcome, SessionOutcome::NothingDue);
        assert!(prompt.seen.is_empty());
        assert_eq!(*store.saves.borrow(), 0);
    }

    #[test]
    fn test_completed_session_updates_due_cards() {
        let deck = sample_deck();
        let store = store_with(deck.clone());
        let mut prompt = ScriptedPrompt::rating(Rating::Good, 3);

        let outcome = runner(&store, 7).run("deck", &mut prompt).unwrap();

        assert_eq!(outcome, SessionOutcome::Completed { reviewed: 3 });
        let saved = store.load("deck").unwrap();
        assert_eq!(saved.len(), 4);
        for (before, after) in deck.iter().zip(&saved) {
            assert_eq!(before.id, after.id);
            if before.is_due(today()) {
                assert_eq!(after.repetitions, 1);
                assert_eq!(after.next_review_date, today() + Duration::days(1));
            } else {
                assert_eq!(before, after);
            }
        }
        let progress: Vec<Progress> = prompt.seen.iter().map(|(_, p)| *p).collect();
        assert_eq!(progress.last(), Some(&Progress { current: 3, total: 3 }));
    }

    #[test]
    fn test_interrupted_session_saves_partial_progress() {
        let deck = sample_deck();
        let store = store_with(deck.clone());
        let mut prompt = ScriptedPrompt::new([
            PromptResponse::Rated(Rating::Easy),
            PromptResponse::Cancelled,
        ]);

        let outcome = runner(&store, 3).run("deck", &mut prompt).unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Interrupted {
                reviewed: 1,
                remaining: 2
            }
        );
        assert_eq!(prompt.seen.len(), 2);
        let reviewed_id = prompt.seen[0].0;

        let saved = store.load("deck").unwrap();
        for (before, after) in deck.iter().zip(&saved) {
            if before.id == reviewed_id {
                assert_eq!(after.repetitions, 1);
                assert!(after.ease_factor > before.ease_factor);
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_cancel_on_first_card_still_saves() {
        let deck = sample_deck();
        let store = store_with(deck.clone());
        let mut prompt = ScriptedPrompt::new([PromptResponse::Cancelled]);

        let outcome = runner(&store, 3).run("deck", &mut prompt).unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Interrupted {
                reviewed: 0,
                remaining: 3
            }
        );
        assert_eq!(*store.saves.borrow(), 1);
        assert_eq!(store.load("deck").unwrap(), deck);
    }

    #[test]
    fn test_long_interval_card_is_saved() {
        let mut veteran = card("veteran", today());
        veteran.repetitions = 5;
        veteran.interval = 50_000_000;
        let deck = vec![veteran, card("fresh", today())];
        let store = store_with(deck.clone());
        let mut prompt = ScriptedPrompt::rating(Rating::Easy, 2);

        let outcome = runner(&store, 5).run("deck", &mut prompt).unwrap();

        assert_eq!(outcome, SessionOutcome::Completed { reviewed: 2 });
        let saved = store.load("deck").unwrap();
        assert_eq!(saved[0].repetitions, 6);
        assert_eq!(saved[0].next_review_date, NaiveDate::MAX);
        assert_eq!(saved[1].next_review_date, today() + Duration::days(1));
    }

    #[test]
    fn test_save_failure_is_reported() {
        let mut store = store_with(sample_deck());
        store.fail_save = true;
        let mut prompt = ScriptedPrompt::rating(Rating::Good, 3);

        let result = runner(&store, 1).run("deck", &mut prompt);

        assert!(matches!(
            result,
            Err(SessionError::Store {
                source: DeckStoreError::Io(_),
                ..
            })
        ));
    }

    #[test]
    fn test_presentation_order_follows_seed() {
        let deck: Vec<Card> = (0..12).map(|i| card(&i.to_string(), today())).collect();

        let order = |seed| {
            let store = store_with(deck.clone());
            let mut prompt = ScriptedPrompt::rating(Rating::Hard, deck.len());
            runner(&store, seed).run("deck", &mut prompt).unwrap();
            prompt.seen.into_iter().map(|(id, _)| id).collect::<Vec<_>>()
        };

        let first = order(42);
        assert_eq!(first, order(42));
        assert_eq!(first.len(), deck.len());

        let mut sorted = first.clone();
        sorted.sort();
        let mut expected: Vec<Uuid> = deck.iter().map(|c| c.id).collect();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_session_against_json_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDeckStore::new(temp_dir.path().to_path_buf());
        let deck = sample_deck();
        store.save("deck", &deck).unwrap();

        let mut session = SessionRunner::new(
            &store,
            FixedClock(today()),
            StdRng::seed_from_u64(9),
            SchedulerConfig::default(),
        );
        let mut prompt = ScriptedPrompt::new([
            PromptResponse::Rated(Rating::Again),
            PromptResponse::Rated(Rating::Good),
            PromptResponse::Cancelled,
        ]);

        let outcome = session.run("deck", &mut prompt).unwrap();
        assert_eq!(
            outcome,
            SessionOutcome::Interrupted {
                reviewed: 2,
                remaining: 1
            }
        );

        let saved = store.load("deck").unwrap();
        let changed = deck.iter().zip(&saved).filter(|(a, b)| a != b).count();
        assert_eq!(changed, 2);
        let order: Vec<Uuid> = saved.iter().map(|c| c.id).collect();
        assert_eq!(order, deck.iter().map(|c| c.id).collect::<Vec<_>>());
    }
}
