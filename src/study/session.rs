//! One study pass over a deck.
//!
//! ```text
//! Active(i, false) --flip--> Active(i, true) --answer--> Active(i + 1, false)
//!                                                   \--> Complete  (i + 1 == size)
//! any --restart--> Active(0, false)
//! ```

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::AnswerRecorder;
use crate::flashcards::{accuracy_percent, Deck, Flashcard};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudyError {
    /// Studying requires at least one flashcard
    #[error("Deck {0} has no flashcards to study")]
    EmptyDeck(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum StudyState {
    Active { index: usize, flipped: bool },
    Complete,
}

/// What an `answer` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Card not flipped yet, or session already complete
    Ignored,
    /// Answer counted, more cards remain
    Recorded,
    /// Answer counted and it was the last card
    Completed,
}

/// Tallies shown when a pass ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySummary {
    pub correct: u32,
    pub incorrect: u32,
    /// Percent correct; `None` when nothing was answered
    pub accuracy: Option<f64>,
}

/// Ephemeral progression through a deck's cards. Never persisted.
#[derive(Debug, Clone)]
pub struct StudySession {
    deck_id: Uuid,
    cards: Vec<Flashcard>,
    index: usize,
    flipped: bool,
    correct: u32,
    incorrect: u32,
}

impl StudySession {
    /// Start at the first card, face down.
    ///
    /// The deck's cards are captured in their current order.
    pub fn new(deck: &Deck) -> Result<Self, StudyError> {
        if deck.flashcards.is_empty() {
            return Err(StudyError::EmptyDeck(deck.id));
        }
        Ok(Self {
            deck_id: deck.id,
            cards: deck.flashcards.clone(),
            index: 0,
            flipped: false,
            correct: 0,
            incorrect: 0,
        })
    }

    pub fn deck_id(&self) -> Uuid {
        self.deck_id
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn state(&self) -> StudyState {
        if self.is_complete() {
            StudyState::Complete
        } else {
            StudyState::Active {
                index: self.index,
                flipped: self.flipped,
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.cards.len()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Card under study, `None` once complete
    pub fn current_card(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    /// 1-based position and total, for "3 of 10"
    pub fn position(&self) -> Option<(usize, usize)> {
        (!self.is_complete()).then(|| (self.index + 1, self.cards.len()))
    }

    /// Share of cards already answered, in percent
    pub fn progress_percent(&self) -> f64 {
        self.index.min(self.cards.len()) as f64 / self.cards.len() as f64 * 100.0
    }

    /// Toggle the current card. No-op once complete.
    pub fn flip(&mut self) {
        if !self.is_complete() {
            self.flipped = !self.flipped;
        }
    }

    /// Answer the current card and move to the next one.
    ///
    /// Only counts while the card is flipped; otherwise nothing changes and
    /// the recorder is not called.
    pub fn answer(&mut self, correct: bool, recorder: &mut dyn AnswerRecorder) -> AnswerOutcome {
        let card_id = match self.current_card() {
            Some(card) if self.flipped => card.id,
            _ => return AnswerOutcome::Ignored,
        };

        recorder.record_answer(self.deck_id, card_id, correct);

        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.index += 1;
        self.flipped = false;

        if self.is_complete() {
            AnswerOutcome::Completed
        } else {
            AnswerOutcome::Recorded
        }
    }

    /// Back to the first card with zeroed session tallies.
    /// Lifetime tallies already recorded are untouched.
    pub fn restart(&mut self) {
        self.index = 0;
        self.flipped = false;
        self.correct = 0;
        self.incorrect = 0;
    }

    pub fn summary(&self) -> StudySummary {
        StudySummary {
            correct: self.correct,
            incorrect: self.incorrect,
            accuracy: accuracy_percent(self.correct, self.incorrect),
        }
    }
}
