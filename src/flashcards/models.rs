//! Data models for decks and flashcards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::UserId;

pub const MAX_DECK_NAME_LENGTH: usize = 50;
pub const MAX_DECK_DESCRIPTION_LENGTH: usize = 200;
pub const MAX_CARD_SIDE_LENGTH: usize = 500;

/// A field value rejected by deck or card validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Editable fields of a deck, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckInput {
    pub name: String,
    pub description: String,
}

impl DeckInput {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Trimmed, length-checked copy
    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text("Deck name", &self.name, MAX_DECK_NAME_LENGTH)?,
            description: optional_text("Description", &self.description, MAX_DECK_DESCRIPTION_LENGTH)?,
        })
    }
}

/// Editable fields of a flashcard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardInput {
    pub front: String,
    pub back: String,
}

impl CardInput {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            front: required_text("Front", &self.front, MAX_CARD_SIDE_LENGTH)?,
            back: required_text("Back", &self.back, MAX_CARD_SIDE_LENGTH)?,
        })
    }
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    optional_text(field, trimmed, max)
}

/// Limits count UTF-16 code units, like the text fields decks were first typed into
fn optional_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.encode_utf16().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// A named collection of flashcards owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
    pub user_id: UserId,
}

impl Deck {
    /// Build an empty deck from already validated input
    pub fn new(user_id: UserId, input: DeckInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            flashcards: Vec::new(),
            created_at: Utc::now(),
            last_studied: None,
            user_id,
        }
    }

    pub fn card(&self, card_id: Uuid) -> Option<&Flashcard> {
        self.flashcards.iter().find(|c| c.id == card_id)
    }

    pub fn is_empty(&self) -> bool {
        self.flashcards.is_empty()
    }

    /// Cards whose front or back contains `term`, ignoring case.
    /// A blank term matches every card.
    pub fn search(&self, term: &str) -> Vec<&Flashcard> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.flashcards.iter().collect();
        }
        self.flashcards
            .iter()
            .filter(|c| c.front.to_lowercase().contains(&term) || c.back.to_lowercase().contains(&term))
            .collect()
    }

    /// Count one answer against a card and mark the deck studied.
    /// Returns false if the card is not in this deck.
    pub fn record_answer(&mut self, card_id: Uuid, correct: bool, at: DateTime<Utc>) -> bool {
        match self.flashcards.iter_mut().find(|c| c.id == card_id) {
            Some(card) => {
                card.record_answer(correct, at);
                self.last_studied = Some(at);
                true
            }
            None => false,
        }
    }

    pub fn times_correct(&self) -> u32 {
        self.flashcards.iter().map(|c| c.times_correct).sum()
    }

    pub fn times_incorrect(&self) -> u32 {
        self.flashcards.iter().map(|c| c.times_incorrect).sum()
    }
}

/// A question/answer pair with lifetime answer tallies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_studied: Option<DateTime<Utc>>,
    #[serde(default)]
    pub times_correct: u32,
    #[serde(default)]
    pub times_incorrect: u32,
}

impl Flashcard {
    /// Build a card from already validated input
    pub fn new(input: CardInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            front: input.front,
            back: input.back,
            created_at: Utc::now(),
            last_studied: None,
            times_correct: 0,
            times_incorrect: 0,
        }
    }

    pub fn record_answer(&mut self, correct: bool, at: DateTime<Utc>) {
        if correct {
            self.times_correct += 1;
        } else {
            self.times_incorrect += 1;
        }
        self.last_studied = Some(at);
    }

    pub fn has_been_studied(&self) -> bool {
        self.times_correct > 0 || self.times_incorrect > 0
    }

    /// Lifetime accuracy in percent, `None` before the first answer
    pub fn accuracy(&self) -> Option<f64> {
        accuracy_percent(self.times_correct, self.times_incorrect)
    }
}

/// `correct / (correct + incorrect)` as a percentage; `None` when both are zero
pub fn accuracy_percent(correct: u32, incorrect: u32) -> Option<f64> {
    let total = correct + incorrect;
    if total == 0 {
        None
    } else {
        Some(f64::from(correct) / f64::from(total) * 100.0)
    }
}

/// Totals shown above a user's deck list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_decks: usize,
    pub total_cards: usize,
    pub studied_decks: usize,
}

impl DashboardStats {
    pub fn from_decks(decks: &[Deck]) -> Self {
        Self {
            total_decks: decks.len(),
            total_cards: decks.iter().map(|d| d.flashcards.len()).sum(),
            studied_decks: decks.iter().filter(|d| d.last_studied.is_some()).count(),
        }
    }
}
