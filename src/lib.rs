//! Flashdeck: local flashcard decks with accounts, auto-save and study sessions.
//!
//! Everything is persisted as JSON values in a [`storage::KeyValueStore`];
//! [`state::Flashdeck`] wires the stores together for a front end.

pub mod auth;
pub mod config;
pub mod debounce;
pub mod flashcards;
pub mod preferences;
pub mod state;
pub mod storage;
pub mod study;

pub use config::AppConfig;
pub use state::Flashdeck;
