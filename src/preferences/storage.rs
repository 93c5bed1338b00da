use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::{DeckDraft, Draft, FlashcardDraft, Theme};
use crate::storage::{self, keys, KeyValueStore};

/// Theme and form drafts. Failures are logged and otherwise ignored.
#[derive(Clone)]
pub struct PreferenceStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored theme, light when unset or unreadable
    pub fn load_theme(&self) -> Theme {
        self.read::<Theme>(keys::THEME).unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) {
        if let Err(e) = storage::write_json(self.kv.as_ref(), keys::THEME, &theme) {
            log::error!("Failed to save theme: {}", e);
        }
    }

    pub fn load_deck_draft(&self) -> Option<DeckDraft> {
        self.read(keys::DECK_DRAFT)
    }

    pub fn save_deck_draft(&self, draft: &DeckDraft) {
        self.save_draft(keys::DECK_DRAFT, draft);
    }

    pub fn clear_deck_draft(&self) {
        self.clear(keys::DECK_DRAFT);
    }

    pub fn load_flashcard_draft(&self) -> Option<FlashcardDraft> {
        self.read(keys::FLASHCARD_DRAFT)
    }

    pub fn save_flashcard_draft(&self, draft: &FlashcardDraft) {
        self.save_draft(keys::FLASHCARD_DRAFT, draft);
    }

    pub fn clear_flashcard_draft(&self) {
        self.clear(keys::FLASHCARD_DRAFT);
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match storage::read_json(self.kv.as_ref(), key) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to load {}: {}", key, e);
                None
            }
        }
    }

    /// Blank drafts are not written
    fn save_draft<T: Draft + Serialize>(&self, key: &str, draft: &T) {
        if draft.is_blank() {
            return;
        }
        if let Err(e) = storage::write_json(self.kv.as_ref(), key, draft) {
            log::error!("Failed to save {}: {}", key, e);
        }
    }

    fn clear(&self, key: &str) {
        if let Err(e) = self.kv.remove(key) {
            log::error!("Failed to clear {}: {}", key, e);
        }
    }
}
