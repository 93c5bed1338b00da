//! Decks of front/back flashcards for Flashdeck
//!
//! This module provides:
//! - Deck and flashcard models with field validation
//! - The merge-by-id deck store shared by all users
//! - One-way JSON export of a deck

pub mod export;
pub mod models;
pub mod storage;

pub use export::{export_deck, write_export, ExportDocument};
pub use models::*;
pub use storage::{DeckError, DeckStore};
