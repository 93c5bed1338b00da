//! One-way deck export to a standalone JSON document

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::models::Deck;

/// A deck rendered for download
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub file_name: String,
    pub contents: String,
}

/// Render a deck with its flashcards as 2-space indented JSON
pub fn export_deck(deck: &Deck) -> Result<ExportDocument, serde_json::Error> {
    Ok(ExportDocument {
        file_name: export_file_name(&deck.name),
        contents: to_pretty_json(deck)?,
    })
}

/// Write the export document for `deck` into `dir`, returning its path
pub fn write_export(deck: &Deck, dir: &Path) -> std::io::Result<PathBuf> {
    let document = export_deck(deck)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(&document.file_name);
    if path.parent() != Some(dir) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("export file name {:?} leaves {:?}", document.file_name, dir),
        ));
    }
    fs::write(&path, document.contents)?;
    log::info!("Exported deck {} to {:?}", deck.id, path);
    Ok(path)
}

/// `<name with whitespace runs as _>_flashcards.json`.
/// Path separators and other characters unsafe in file names also become `_`.
pub fn export_file_name(deck_name: &str) -> String {
    let mut name = String::with_capacity(deck_name.len());
    let mut in_space = false;
    for c in deck_name.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(if is_path_unsafe(c) { '_' } else { c });
            in_space = false;
        }
    }
    format!("{}_flashcards.json", name)
}

fn is_path_unsafe(c: char) -> bool {
    c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::models::{CardInput, DeckInput, Flashcard};
    use tempfile::TempDir;

    fn sample_deck() -> Deck {
        let mut deck = Deck::new("alice".to_string(), DeckInput::new("World  Capitals\tEU", "desc"));
        deck.flashcards.push(Flashcard::new(CardInput::new("France", "Paris")));
        deck
    }

    #[test]
    fn test_file_name() {
        assert_eq!(export_file_name("Capitals"), "Capitals_flashcards.json");
        assert_eq!(export_file_name("World  Capitals\tEU"), "World_Capitals_EU_flashcards.json");
        assert_eq!(export_file_name("../escaped"), ".._escaped_flashcards.json");
        assert_eq!(export_file_name("a/b\\c:d"), "a_b_c_d_flashcards.json");
    }

    #[test]
    fn test_contents_are_indented_deck_json() {
        let deck = sample_deck();
        let document = export_deck(&deck).unwrap();

        assert!(document.contents.starts_with("{\n  \"id\": "));
        assert!(document.contents.contains("\n      \"front\": \"France\""));

        let parsed: Deck = serde_json::from_str(&document.contents).unwrap();
        assert_eq!(parsed, deck);
    }

    #[test]
    fn test_write_export() {
        let temp = TempDir::new().unwrap();
        let deck = sample_deck();

        let path = write_export(&deck, temp.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "World_Capitals_EU_flashcards.json");
        assert!(fs::read_to_string(path).unwrap().contains("Paris"));
    }

    #[test]
    fn test_write_export_stays_in_dir() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");

        for name in ["../escaped", "a/b"] {
            let deck = Deck::new("alice".to_string(), DeckInput::new(name, ""));
            let path = write_export(&deck, &out).unwrap();
            assert_eq!(path.parent(), Some(out.as_path()));
            assert!(path.exists());
        }
        assert!(!temp.path().join("escaped_flashcards.json").exists());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }
}
