//! Deck collection persisted under a single storage key.
//!
//! Every user's decks live in the same JSON array; flashcards are nested in
//! their deck, so removing a deck removes its cards with it.
//!
//! `save_decks` merges by deck id and performs no ownership check: callers
//! pass decks already filtered to one user.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Deck, ValidationError};
use crate::storage::{self, keys, KeyValueStore, StorageError};
use crate::study::AnswerRecorder;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, DeckError>;

/// Storage manager for decks and their flashcards
#[derive(Clone)]
pub struct DeckStore {
    kv: Arc<dyn KeyValueStore>,
}

impl DeckStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Every stored deck; empty when nothing readable is stored
    pub fn load_all_decks(&self) -> Vec<Deck> {
        match storage::read_json::<Vec<Deck>>(self.kv.as_ref(), keys::DECKS) {
            Ok(decks) => decks.unwrap_or_default(),
            Err(e) => {
                log::error!("Failed to load decks: {}", e);
                Vec::new()
            }
        }
    }

    /// Decks owned by `user_id`, in stored order
    pub fn load_user_decks(&self, user_id: &str) -> Vec<Deck> {
        self.load_all_decks()
            .into_iter()
            .filter(|d| d.user_id == user_id)
            .collect()
    }

    pub fn get_deck(&self, deck_id: Uuid) -> Option<Deck> {
        self.load_all_decks().into_iter().find(|d| d.id == deck_id)
    }

    /// Merge `decks` into the stored collection by id.
    ///
    /// Stored decks whose id appears in `decks` are replaced, the rest are
    /// kept untouched, and the union is written back in one write.
    pub fn save_decks(&self, decks: &[Deck]) -> std::result::Result<(), StorageError> {
        let mut merged: Vec<Deck> = self
            .load_all_decks()
            .into_iter()
            .filter(|stored| !decks.iter().any(|d| d.id == stored.id))
            .collect();
        merged.extend_from_slice(decks);

        storage::write_json(self.kv.as_ref(), keys::DECKS, &merged).map_err(|e| {
            log::error!("Failed to save decks: {}", e);
            e
        })
    }

    /// Remove a deck and its flashcards from storage.
    /// Returns whether the deck was stored.
    pub fn delete_deck(&self, deck_id: Uuid) -> std::result::Result<bool, StorageError> {
        let mut decks = self.load_all_decks();
        let before = decks.len();
        decks.retain(|d| d.id != deck_id);
        if decks.len() == before {
            return Ok(false);
        }

        storage::write_json(self.kv.as_ref(), keys::DECKS, &decks).map_err(|e| {
            log::error!("Failed to delete deck {}: {}", deck_id, e);
            e
        })?;
        log::info!("Deleted deck {}", deck_id);
        Ok(true)
    }
}

impl AnswerRecorder for DeckStore {
    fn record_answer(&mut self, deck_id: Uuid, card_id: Uuid, correct: bool) {
        let Some(mut deck) = self.get_deck(deck_id) else {
            log::warn!("Answer for unknown deck {}", deck_id);
            return;
        };

        if !deck.record_answer(card_id, correct, Utc::now()) {
            log::warn!("Answer for unknown card {} in deck {}", card_id, deck_id);
            return;
        }

        // Failure is already logged by save_decks
        let _ = self.save_decks(std::slice::from_ref(&deck));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::models::{CardInput, DeckInput, Flashcard};
    use crate::storage::{FileStorage, MemoryStorage};
    use tempfile::TempDir;

    fn deck(user_id: &str, name: &str, cards: usize) -> Deck {
        let mut deck = Deck::new(user_id.to_string(), DeckInput::new(name, ""));
        for i in 0..cards {
            deck.flashcards
                .push(Flashcard::new(CardInput::new(format!("Q{}", i), format!("A{}", i))));
        }
        deck
    }

    fn create_test_store() -> (DeckStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let kv = Arc::new(FileStorage::new(temp_dir.path().to_path_buf()));
        (DeckStore::new(kv), temp_dir)
    }

    #[test]
    fn test_load_missing_or_corrupt() {
        let kv = Arc::new(MemoryStorage::new());
        let store = DeckStore::new(kv.clone());
        assert!(store.load_all_decks().is_empty());

        kv.set(keys::DECKS, "[{\"id\": \"not-a-uuid\"}]").unwrap();
        assert!(store.load_all_decks().is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_fields() {
        let (store, _temp) = create_test_store();
        let mut studied = deck("alice", "Capitals", 2);
        let card_id = studied.flashcards[0].id;
        studied.record_answer(card_id, true, Utc::now());

        store.save_decks(&[studied.clone()]).unwrap();

        let loaded = store.load_all_decks();
        assert_eq!(loaded, vec![studied]);
    }

    #[test]
    fn test_save_merges_by_id() {
        let (store, _temp) = create_test_store();
        let alice_1 = deck("alice", "Capitals", 1);
        let alice_2 = deck("alice", "Rivers", 1);
        let bob = deck("bob", "Verbs", 3);
        store.save_decks(&[alice_1.clone(), alice_2.clone()]).unwrap();
        store.save_decks(&[bob.clone()]).unwrap();

        // Only alice's decks held in memory, one of them edited
        let mut edited = alice_1.clone();
        edited.name = "World Capitals".to_string();
        store.save_decks(&[edited.clone(), alice_2.clone()]).unwrap();

        let all = store.load_all_decks();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&bob));
        assert!(all.contains(&edited));
        assert!(all.contains(&alice_2));
        assert!(!all.contains(&alice_1));

        let bobs = store.load_user_decks("bob");
        assert_eq!(bobs, vec![bob]);
        assert_eq!(store.load_user_decks("alice").len(), 2);
    }

    #[test]
    fn test_save_empty_set_changes_nothing() {
        let (store, _temp) = create_test_store();
        let bob = deck("bob", "Verbs", 1);
        store.save_decks(&[bob.clone()]).unwrap();
        store.save_decks(&[]).unwrap();
        assert_eq!(store.load_all_decks(), vec![bob]);
    }

    #[test]
    fn test_delete_deck_cascades() {
        let (store, _temp) = create_test_store();
        let doomed = deck("alice", "Capitals", 3);
        let kept = deck("alice", "Rivers", 1);
        store.save_decks(&[doomed.clone(), kept.clone()]).unwrap();

        assert!(store.delete_deck(doomed.id).unwrap());
        assert!(!store.delete_deck(doomed.id).unwrap());

        let all = store.load_all_decks();
        assert_eq!(all, vec![kept]);
        assert!(store.get_deck(doomed.id).is_none());
    }

    #[test]
    fn test_record_answer_persists() {
        let (mut store, _temp) = create_test_store();
        let d = deck("alice", "Capitals", 1);
        let card_id = d.flashcards[0].id;
        store.save_decks(&[d.clone()]).unwrap();

        store.record_answer(d.id, card_id, true);
        store.record_answer(d.id, card_id, false);
        store.record_answer(d.id, card_id, true);

        let loaded = store.get_deck(d.id).unwrap();
        assert_eq!(loaded.flashcards[0].times_correct, 2);
        assert_eq!(loaded.flashcards[0].times_incorrect, 1);
        assert!(loaded.last_studied.is_some());
    }
}
