use std::path::PathBuf;

use anyhow::{Context, Result};

use flashdeck_lib::flashcards::{self, accuracy_percent, DeckError, DeckInput};
use flashdeck_lib::preferences::DeckDraft;

use crate::app::{prompt, App};
use crate::render::terminal::{self, format_accuracy, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    app.require_user()?;
    let decks = app.flashdeck.flashcards.decks();
    let stats = app.flashdeck.flashcards.stats();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "stats": stats,
                "decks": decks.iter().map(|d| serde_json::json!({
                    "id": d.id.to_string(),
                    "name": d.name,
                    "description": d.description,
                    "cardCount": d.flashcards.len(),
                    "lastStudied": d.last_studied.map(|t| t.to_rfc3339()),
                    "accuracy": accuracy_percent(d.times_correct(), d.times_incorrect()),
                })).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} decks, {} cards, {} studied",
                stats.total_decks, stats.total_cards, stats.studied_decks
            );
            if decks.is_empty() {
                println!("  (no decks, create one with `deck create <name>`)");
                return Ok(());
            }
            println!();
            for deck in decks {
                let studied = deck
                    .last_studied
                    .map(|t| format!("studied {}", t.format("%Y-%m-%d")))
                    .unwrap_or_else(|| "never studied".to_string());
                let accuracy = format_accuracy(accuracy_percent(deck.times_correct(), deck.times_incorrect()));
                println!(
                    "  {} ({} cards, {}, accuracy {})",
                    terminal::paint(&deck.name, Color::BOLD, use_color),
                    deck.flashcards.len(),
                    studied,
                    accuracy
                );
                if !deck.description.is_empty() {
                    println!("    {}", terminal::paint(&deck.description, Color::DIM, use_color));
                }
            }
        }
    }

    Ok(())
}

pub fn run_create(
    app: &mut App,
    name: Option<String>,
    description: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    app.require_user()?;
    let draft = app.flashdeck.preferences.load_deck_draft().unwrap_or_default();
    let input = DeckInput::new(
        name.unwrap_or(draft.name),
        description.unwrap_or(draft.description),
    );

    let deck = match app.flashdeck.flashcards.create_deck(&input) {
        Ok(deck) => deck,
        Err(DeckError::Validation(e)) => {
            app.flashdeck.preferences.save_deck_draft(&DeckDraft {
                name: input.name,
                description: input.description,
            });
            return Err(e).context("Deck not created, your input was kept as a draft");
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&deck)?),
        OutputFormat::Plain => {
            println!("Created deck \"{}\"", deck.name);
            println!("  ID: {}", deck.id);
        }
    }
    Ok(())
}

pub fn run_edit(
    app: &mut App,
    deck_name: &str,
    name: Option<String>,
    description: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let deck = app.find_deck(deck_name)?;
    let input = DeckInput::new(
        name.unwrap_or(deck.name),
        description.unwrap_or(deck.description),
    );
    let updated = app.flashdeck.flashcards.edit_deck(deck.id, &input)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&updated)?),
        OutputFormat::Plain => println!("Updated deck \"{}\"", updated.name),
    }
    Ok(())
}

pub fn run_show(
    app: &App,
    deck_name: &str,
    search: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let deck = app.find_deck(deck_name)?;
    let hits = deck.search(search.unwrap_or(""));

    // Numbered by position in the whole deck so `card edit <n>` matches
    let numbered: Vec<(usize, &flashcards::Flashcard)> = deck
        .flashcards
        .iter()
        .enumerate()
        .filter(|(_, c)| hits.iter().any(|h| h.id == c.id))
        .map(|(i, c)| (i + 1, c))
        .collect();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": deck.id.to_string(),
                "name": deck.name,
                "description": deck.description,
                "createdAt": deck.created_at.to_rfc3339(),
                "lastStudied": deck.last_studied.map(|t| t.to_rfc3339()),
                "flashcards": numbered.iter().map(|(n, c)| serde_json::json!({
                    "number": n,
                    "id": c.id.to_string(),
                    "front": c.front,
                    "back": c.back,
                    "timesCorrect": c.times_correct,
                    "timesIncorrect": c.times_incorrect,
                    "accuracy": c.accuracy(),
                })).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::paint(&deck.name, Color::BOLD, use_color));
            if !deck.description.is_empty() {
                println!("{}", terminal::paint(&deck.description, Color::DIM, use_color));
            }
            println!();

            if deck.is_empty() {
                println!("  (no cards, add one with `card add`)");
            } else if numbered.is_empty() {
                println!("  (no cards match \"{}\")", search.unwrap_or_default());
            }
            for (number, card) in &numbered {
                let id = card.id.to_string();
                println!(
                    "{:>3}. {} {}",
                    number,
                    card.front,
                    terminal::paint(&format!("[{}]", &id[..8]), Color::GRAY, use_color)
                );
                println!("     {}", terminal::paint(&card.back, Color::CYAN, use_color));
                if card.has_been_studied() {
                    println!(
                        "     {} correct, {} incorrect ({})",
                        card.times_correct,
                        card.times_incorrect,
                        format_accuracy(card.accuracy())
                    );
                }
            }
        }
    }

    Ok(())
}

pub async fn run_delete(app: &mut App, deck_name: &str, yes: bool) -> Result<()> {
    let deck = app.find_deck(deck_name)?;

    if !yes {
        let answer = prompt(&format!(
            "Delete deck \"{}\" and its {} cards? [y/N] ",
            deck.name,
            deck.flashcards.len()
        ))?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    app.flashdeck.flashcards.delete_deck(deck.id).await?;
    println!("Deleted deck \"{}\"", deck.name);
    Ok(())
}

pub fn run_export(
    app: &App,
    deck_name: &str,
    out: Option<PathBuf>,
    format: &OutputFormat,
) -> Result<()> {
    let deck = app.find_deck(deck_name)?;
    let dir = match out {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let path = flashcards::write_export(&deck, &dir)
        .with_context(|| format!("Failed to export deck to {:?}", dir))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "path": path.to_string_lossy() });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Exported \"{}\" to {}", deck.name, path.display()),
    }
    Ok(())
}
