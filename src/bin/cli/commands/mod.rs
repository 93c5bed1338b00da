pub mod auth;
pub mod cards;
pub mod decks;
pub mod study;
pub mod theme;
