//! Theme choice and unsaved form drafts

pub mod models;
pub mod storage;

pub use models::{DeckDraft, Draft, FlashcardDraft, Theme};
pub use storage::PreferenceStore;
