//! Storage keys and the component that owns each one

/// `{userId, expiresAt}` written by the session manager
pub const SESSION: &str = "flashcard-session";

/// Every stored user including the password digest
pub const USERS: &str = "flashcard-users";

/// Every deck of every user, flashcards nested
pub const DECKS: &str = "flashcard-decks";

pub const THEME: &str = "flashcard-theme";

pub const DECK_DRAFT: &str = "deck-draft";

pub const FLASHCARD_DRAFT: &str = "flashcard-draft";
