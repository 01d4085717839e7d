//! SM-2 Spaced Repetition Algorithm
//!
//! Simplified SuperMemo 2: a failing score restarts the card at a one day
//! interval, successes step through 1 day, 6 days, then grow by the ease
//! factor. The ease factor moves with every review and is floored.
//!
//! Scores use the SM-2 0-5 scale; anything below 3 is a failure.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::models::{Card, Rating, DEFAULT_EASE_FACTOR};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Lowest score that counts as a successful recall
pub const PASSING_SCORE: u8 = 3;

const MAX_SCORE: u8 = 5;

/// SM-2 score assigned to each rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingScores {
    pub again: u8,
    pub hard: u8,
    pub good: u8,
    pub easy: u8,
}

impl Default for RatingScores {
    fn default() -> Self {
        Self {
            again: 0,
            hard: 3,
            good: 4,
            easy: 5,
        }
    }
}

impl RatingScores {
    pub fn score(&self, rating: Rating) -> u8 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }
}

/// Tunables for the scheduler, passed explicitly into every review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ease factor given to new cards
    pub initial_ease_factor: f64,
    /// Floor applied after every ease factor update
    pub minimum_ease_factor: f64,
    pub scores: RatingScores,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease_factor: DEFAULT_EASE_FACTOR,
            minimum_ease_factor: MIN_EASE_FACTOR,
            scores: RatingScores::default(),
        }
    }
}

/// Compute the state of `card` after a review scored `score` on `today`.
///
/// `front`, `back` and `id` are carried over untouched. Scores above 5 are
/// treated as 5.
pub fn review_card(card: &Card, score: u8, today: NaiveDate, config: &SchedulerConfig) -> Card {
    let score = score.min(MAX_SCORE);
    let mut next = card.clone();

    next.interval = next_interval(card, score);
    next.repetitions = if score < PASSING_SCORE {
        0
    } else {
        card.repetitions.saturating_add(1)
    };

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let miss = (MAX_SCORE - score) as f64;
    // A configured floor can raise the minimum but never lower it
    let floor = config.minimum_ease_factor.max(MIN_EASE_FACTOR);
    next.ease_factor = (card.ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(floor);

    // Intervals have no cap; dates past the calendar's end pin to its last day
    next.next_review_date = today
        .checked_add_days(Days::new(next.interval as u64))
        .unwrap_or(NaiveDate::MAX);

    log::debug!(
        "Scheduled card {} (score {}): interval {}d, ease {:.2}, due {}",
        card.id,
        score,
        next.interval,
        next.ease_factor,
        next.next_review_date
    );

    next
}

/// Interval in days a review scored `score` gives `card`
pub fn next_interval(card: &Card, score: u8) -> u32 {
    if score < PASSING_SCORE {
        return 1;
    }
    match card.repetitions {
        0 => 1,
        1 => 6,
        // f64::round rounds halves away from zero, i.e. half-up here
        _ => (card.interval as f64 * card.ease_factor)
            .round()
            .clamp(1.0, u32::MAX as f64) as u32,
    }
}

/// Review `card` with a rating, using the configured score for it
pub fn review_with_rating(
    card: &Card,
    rating: Rating,
    today: NaiveDate,
    config: &SchedulerConfig,
) -> Card {
    review_card(card, config.scores.score(rating), today, config)
}

/// Calculate the interval each rating would give.
/// Used to show users what they are choosing between.
pub fn preview_intervals(card: &Card, config: &SchedulerConfig) -> [(Rating, u32); 4] {
    Rating::ALL.map(|rating| {
        let score = config.scores.score(rating).min(MAX_SCORE);
        (rating, next_interval(card, score))
    })
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    if days == 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
