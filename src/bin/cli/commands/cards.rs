use anyhow::{Context, Result};

use flashdeck_lib::flashcards::{CardInput, DeckError, Flashcard};
use flashdeck_lib::preferences::FlashcardDraft;

use crate::app::App;
use crate::OutputFormat;

fn print_card(card: &Flashcard, headline: &str, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(card)?),
        OutputFormat::Plain => {
            println!("{}", headline);
            println!("  Front: {}", card.front);
            println!("  Back:  {}", card.back);
            println!("  ID:    {}", card.id);
        }
    }
    Ok(())
}

pub fn run_add(
    app: &mut App,
    deck_name: &str,
    front: Option<String>,
    back: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let deck = app.find_deck(deck_name)?;
    let draft = app.flashdeck.preferences.load_flashcard_draft().unwrap_or_default();
    let input = CardInput::new(front.unwrap_or(draft.front), back.unwrap_or(draft.back));

    let card = match app.flashdeck.flashcards.add_card(deck.id, &input) {
        Ok(card) => card,
        Err(DeckError::Validation(e)) => {
            app.flashdeck.preferences.save_flashcard_draft(&FlashcardDraft {
                front: input.front,
                back: input.back,
            });
            return Err(e).context("Card not added, your input was kept as a draft");
        }
        Err(e) => return Err(e.into()),
    };

    print_card(&card, &format!("Added card to \"{}\"", deck.name), format)
}

pub fn run_edit(
    app: &mut App,
    deck_name: &str,
    card_key: &str,
    front: Option<String>,
    back: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let deck = app.find_deck(deck_name)?;
    let card = App::find_card(&deck, card_key)?;
    let input = CardInput::new(front.unwrap_or(card.front), back.unwrap_or(card.back));

    let updated = app.flashdeck.flashcards.edit_card(deck.id, card.id, &input)?;
    print_card(&updated, "Updated card", format)
}

pub fn run_delete(app: &mut App, deck_name: &str, card_key: &str) -> Result<()> {
    let deck = app.find_deck(deck_name)?;
    let card = App::find_card(&deck, card_key)?;

    app.flashdeck.flashcards.delete_card(deck.id, card.id)?;
    println!("Deleted card \"{}\" from \"{}\"", card.front, deck.name);
    Ok(())
}
