use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Context, Result};

use flashdeck_lib::auth::User;
use flashdeck_lib::flashcards::{Deck, Flashcard};
use flashdeck_lib::{AppConfig, Flashdeck};

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub flashdeck: Flashdeck,
}

impl App {
    /// Open storage and resume the stored session, if any
    pub fn new(config: AppConfig) -> Result<Self> {
        let storage = config
            .open_storage()
            .context("Failed to open data directory")?;

        let mut flashdeck = Flashdeck::new(storage, &config);
        if let Some(user) = flashdeck.restore_session() {
            log::debug!("Resumed session for {}", user.email);
        }

        Ok(Self { config, flashdeck })
    }

    /// The signed-in user, or an error telling how to sign in
    pub fn require_user(&self) -> Result<User> {
        match self.flashdeck.user() {
            Some(user) => Ok(user.clone()),
            None => bail!("Not logged in. Run `flashdeck-cli login <email>` first."),
        }
    }

    /// Find one of the user's decks by name (case-insensitive prefix match)
    pub fn find_deck(&self, name: &str) -> Result<Deck> {
        self.require_user()?;
        let decks = self.flashdeck.flashcards.decks();
        let name_lower = name.to_lowercase();

        // Exact match first
        if let Some(deck) = decks.iter().find(|d| d.name.to_lowercase() == name_lower) {
            return Ok(deck.clone());
        }

        // Prefix match
        let matches: Vec<&Deck> = decks
            .iter()
            .filter(|d| d.name.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 if decks.is_empty() => bail!("No deck matching '{}'. You have no decks yet.", name),
            0 => bail!("No deck matching '{}'. Available decks:\n{}", name,
                decks.iter().map(|d| format!("  - {}", d.name)).collect::<Vec<_>>().join("\n")),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous deck name '{}'. Matches:\n{}", name,
                matches.iter().map(|d| format!("  - {}", d.name)).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Find a card by its 1-based position in the deck or an id prefix
    pub fn find_card(deck: &Deck, key: &str) -> Result<Flashcard> {
        if let Ok(position) = key.parse::<usize>() {
            return match position.checked_sub(1).and_then(|i| deck.flashcards.get(i)) {
                Some(card) => Ok(card.clone()),
                None => bail!("Deck '{}' has no card #{} ({} cards)", deck.name, position,
                    deck.flashcards.len()),
            };
        }

        let key_lower = key.to_lowercase();
        let matches: Vec<&Flashcard> = deck
            .flashcards
            .iter()
            .filter(|c| c.id.to_string().starts_with(&key_lower))
            .collect();

        match matches.len() {
            0 => bail!("No card matching '{}' in deck '{}'", key, deck.name),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous card id '{}', give more characters", key),
        }
    }

    /// Write pending deck edits before exit
    pub async fn shutdown(self) {
        self.flashdeck.shutdown().await;
    }
}

/// Print `label` and read one trimmed line from stdin
pub fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    read_line(io::stdin().lock())
}

fn read_line(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("Unexpected end of input");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Use the given password, or ask for it when omitted. A terminal gets a
/// hidden prompt; piped input is read as a plain line.
pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None if io::stdin().is_terminal() => Ok(dialoguer::Password::new()
            .with_prompt("Password")
            .interact()?),
        None => read_line(io::stdin().lock()),
    }
}
