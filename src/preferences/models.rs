use serde::{Deserialize, Serialize};

/// Color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Unsaved deck form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Unsaved flashcard form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashcardDraft {
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

/// A form draft that is only worth keeping when something was typed
pub trait Draft {
    fn is_blank(&self) -> bool;
}

impl Draft for DeckDraft {
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.description.trim().is_empty()
    }
}

impl Draft for FlashcardDraft {
    fn is_blank(&self) -> bool {
        self.front.trim().is_empty() && self.back.trim().is_empty()
    }
}
