//! Deck collection state for the signed-in user.
//!
//! Changes go through [`reduce`]; the controller persists the resulting deck
//! list through a debounced write so a burst of edits costs one write.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::UserId;
use crate::debounce::Debouncer;
use crate::flashcards::{
    CardInput, DashboardStats, Deck, DeckError, DeckInput, DeckStore, Flashcard,
};
use crate::preferences::{PreferenceStore, Theme};
use crate::study::AnswerRecorder;

type Result<T> = std::result::Result<T, DeckError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardState {
    pub decks: Vec<Deck>,
    pub current_deck_id: Option<Uuid>,
    pub theme: Theme,
}

impl FlashcardState {
    pub fn deck(&self, deck_id: Uuid) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id == deck_id)
    }

    /// The deck being viewed or studied, looked up from `decks`
    pub fn current_deck(&self) -> Option<&Deck> {
        self.current_deck_id.and_then(|id| self.deck(id))
    }

    fn deck_mut(&mut self, deck_id: Uuid) -> Option<&mut Deck> {
        self.decks.iter_mut().find(|d| d.id == deck_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlashcardAction {
    SetDecks(Vec<Deck>),
    /// Keep only the decks owned by `user_id`
    SetUserDecks { decks: Vec<Deck>, user_id: UserId },
    AddDeck(Deck),
    UpdateDeck(Deck),
    DeleteDeck(Uuid),
    SetCurrentDeck(Option<Uuid>),
    AddFlashcard { deck_id: Uuid, flashcard: Flashcard },
    UpdateFlashcard { deck_id: Uuid, flashcard: Flashcard },
    DeleteFlashcard { deck_id: Uuid, flashcard_id: Uuid },
    UpdateFlashcardStats {
        deck_id: Uuid,
        flashcard_id: Uuid,
        correct: bool,
        at: DateTime<Utc>,
    },
    ToggleTheme,
}

impl FlashcardAction {
    /// Whether this action edits the deck list, as opposed to loading it
    pub fn edits_decks(&self) -> bool {
        !matches!(
            self,
            Self::SetDecks(_) | Self::SetUserDecks { .. } | Self::SetCurrentDeck(_) | Self::ToggleTheme
        )
    }
}

pub fn reduce(mut state: FlashcardState, action: FlashcardAction) -> FlashcardState {
    match action {
        FlashcardAction::SetDecks(decks) => state.decks = decks,
        FlashcardAction::SetUserDecks { decks, user_id } => {
            state.decks = decks.into_iter().filter(|d| d.user_id == user_id).collect();
        }
        FlashcardAction::AddDeck(deck) => state.decks.push(deck),
        FlashcardAction::UpdateDeck(deck) => {
            if let Some(existing) = state.deck_mut(deck.id) {
                *existing = deck;
            }
        }
        FlashcardAction::DeleteDeck(deck_id) => {
            state.decks.retain(|d| d.id != deck_id);
            if state.current_deck_id == Some(deck_id) {
                state.current_deck_id = None;
            }
        }
        FlashcardAction::SetCurrentDeck(deck_id) => state.current_deck_id = deck_id,
        FlashcardAction::AddFlashcard { deck_id, flashcard } => {
            if let Some(deck) = state.deck_mut(deck_id) {
                deck.flashcards.push(flashcard);
            }
        }
        FlashcardAction::UpdateFlashcard { deck_id, flashcard } => {
            if let Some(card) = state
                .deck_mut(deck_id)
                .and_then(|d| d.flashcards.iter_mut().find(|c| c.id == flashcard.id))
            {
                *card = flashcard;
            }
        }
        FlashcardAction::DeleteFlashcard { deck_id, flashcard_id } => {
            if let Some(deck) = state.deck_mut(deck_id) {
                deck.flashcards.retain(|c| c.id != flashcard_id);
            }
        }
        FlashcardAction::UpdateFlashcardStats {
            deck_id,
            flashcard_id,
            correct,
            at,
        } => {
            if let Some(deck) = state.deck_mut(deck_id) {
                deck.record_answer(flashcard_id, correct, at);
            }
        }
        FlashcardAction::ToggleTheme => state.theme = state.theme.toggled(),
    }
    state
}

/// Owns the deck state of one signed-in user and keeps storage in step
pub struct FlashcardController {
    store: DeckStore,
    prefs: PreferenceStore,
    state: FlashcardState,
    user_id: Option<UserId>,
    saver: Debouncer<Vec<Deck>>,
    last_saved: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl FlashcardController {
    /// Must be called inside a tokio runtime; the debounced writer is spawned on it
    pub fn new(store: DeckStore, prefs: PreferenceStore, quiet_period: Duration) -> Self {
        let last_saved = Arc::new(Mutex::new(None));

        let sink_store = store.clone();
        let sink_saved = Arc::clone(&last_saved);
        let saver = Debouncer::new(quiet_period, move |decks: Vec<Deck>| {
            if sink_store.save_decks(&decks).is_ok() {
                log::debug!("Auto-saved {} decks", decks.len());
                if let Ok(mut saved) = sink_saved.lock() {
                    *saved = Some(Utc::now());
                }
            }
        });

        let state = FlashcardState {
            theme: prefs.load_theme(),
            ..FlashcardState::default()
        };

        Self {
            store,
            prefs,
            state,
            user_id: None,
            saver,
            last_saved,
        }
    }

    pub fn state(&self) -> &FlashcardState {
        &self.state
    }

    pub fn decks(&self) -> &[Deck] {
        &self.state.decks
    }

    pub fn deck(&self, deck_id: Uuid) -> Option<&Deck> {
        self.state.deck(deck_id)
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_decks(&self.state.decks)
    }

    pub fn is_auto_saving(&self) -> bool {
        self.saver.is_pending()
    }

    /// When the deck list was last written by the auto-saver
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved.lock().ok().and_then(|saved| *saved)
    }

    pub fn dispatch(&mut self, action: FlashcardAction) {
        let edits_decks = action.edits_decks();
        let toggles_theme = matches!(action, FlashcardAction::ToggleTheme);

        self.state = reduce(std::mem::take(&mut self.state), action);

        if edits_decks {
            self.saver.submit(self.state.decks.clone());
        }
        if toggles_theme {
            self.prefs.save_theme(self.state.theme);
        }
    }

    /// Replace the in-memory decks with those stored for `user_id`
    pub fn load_user_decks(&mut self, user_id: &str) {
        self.user_id = Some(user_id.to_string());
        let decks = self.store.load_all_decks();
        self.dispatch(FlashcardAction::SetUserDecks {
            decks,
            user_id: user_id.to_string(),
        });
        log::info!("Loaded {} decks for user {}", self.state.decks.len(), user_id);
    }

    /// Write pending edits, then forget the user's decks
    pub async fn unload(&mut self) {
        self.saver.flush().await;
        self.user_id = None;
        self.dispatch(FlashcardAction::SetCurrentDeck(None));
        self.dispatch(FlashcardAction::SetDecks(Vec::new()));
    }

    pub fn select_deck(&mut self, deck_id: Option<Uuid>) -> Result<()> {
        if let Some(id) = deck_id {
            self.require_deck(id)?;
        }
        self.dispatch(FlashcardAction::SetCurrentDeck(deck_id));
        Ok(())
    }

    pub fn create_deck(&mut self, input: &DeckInput) -> Result<Deck> {
        let user_id = self.user_id.clone().ok_or(DeckError::NotSignedIn)?;
        let deck = Deck::new(user_id, input.validated()?);

        self.dispatch(FlashcardAction::AddDeck(deck.clone()));
        self.prefs.clear_deck_draft();
        log::info!("Created deck {} ({})", deck.name, deck.id);
        Ok(deck)
    }

    pub fn edit_deck(&mut self, deck_id: Uuid, input: &DeckInput) -> Result<Deck> {
        let input = input.validated()?;
        let mut deck = self.require_deck(deck_id)?.clone();
        deck.name = input.name;
        deck.description = input.description;

        self.dispatch(FlashcardAction::UpdateDeck(deck.clone()));
        Ok(deck)
    }

    /// Remove a deck and its cards, from memory and from storage
    pub async fn delete_deck(&mut self, deck_id: Uuid) -> Result<()> {
        self.require_deck(deck_id)?;
        self.dispatch(FlashcardAction::DeleteDeck(deck_id));

        // No pending write may still carry the deck once it is gone from storage
        self.saver.flush().await;
        self.store.delete_deck(deck_id)?;
        Ok(())
    }

    pub fn add_card(&mut self, deck_id: Uuid, input: &CardInput) -> Result<Flashcard> {
        self.require_deck(deck_id)?;
        let flashcard = Flashcard::new(input.validated()?);

        self.dispatch(FlashcardAction::AddFlashcard {
            deck_id,
            flashcard: flashcard.clone(),
        });
        self.prefs.clear_flashcard_draft();
        Ok(flashcard)
    }

    pub fn edit_card(&mut self, deck_id: Uuid, card_id: Uuid, input: &CardInput) -> Result<Flashcard> {
        let input = input.validated()?;
        let mut flashcard = self
            .require_deck(deck_id)?
            .card(card_id)
            .cloned()
            .ok_or(DeckError::CardNotFound(card_id))?;
        flashcard.front = input.front;
        flashcard.back = input.back;

        self.dispatch(FlashcardAction::UpdateFlashcard {
            deck_id,
            flashcard: flashcard.clone(),
        });
        Ok(flashcard)
    }

    pub fn delete_card(&mut self, deck_id: Uuid, card_id: Uuid) -> Result<()> {
        if self.require_deck(deck_id)?.card(card_id).is_none() {
            return Err(DeckError::CardNotFound(card_id));
        }
        self.dispatch(FlashcardAction::DeleteFlashcard {
            deck_id,
            flashcard_id: card_id,
        });
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.dispatch(FlashcardAction::ToggleTheme);
        self.state.theme
    }

    /// Write pending deck edits now
    pub async fn flush(&self) {
        self.saver.flush().await;
    }

    /// Write pending deck edits and stop the auto-saver
    pub async fn shutdown(self) {
        self.saver.shutdown().await;
    }

    fn require_deck(&self, deck_id: Uuid) -> Result<&Deck> {
        self.state.deck(deck_id).ok_or(DeckError::DeckNotFound(deck_id))
    }
}

impl AnswerRecorder for FlashcardController {
    fn record_answer(&mut self, deck_id: Uuid, card_id: Uuid, correct: bool) {
        if self.deck(deck_id).and_then(|d| d.card(card_id)).is_none() {
            log::warn!("Answer for unknown card {} in deck {}", card_id, deck_id);
            return;
        }
        self.dispatch(FlashcardAction::UpdateFlashcardStats {
            deck_id,
            flashcard_id: card_id,
            correct,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::ValidationError;
    use crate::storage::{keys, KeyValueStore, MemoryStorage};
    use crate::study::{AnswerOutcome, StudySession};

    const QUIET: Duration = Duration::from_millis(300);

    fn setup() -> (FlashcardController, DeckStore, Arc<MemoryStorage>) {
        let kv = Arc::new(MemoryStorage::new());
        let store = DeckStore::new(kv.clone());
        let controller = FlashcardController::new(store.clone(), PreferenceStore::new(kv.clone()), QUIET);
        (controller, store, kv)
    }

    async fn settle() {
        tokio::time::sleep(QUIET + Duration::from_millis(1)).await;
    }

    #[test]
    fn test_reducer_deck_and_card_actions() {
        let deck = Deck::new("alice".to_string(), DeckInput::new("Capitals", ""));
        let deck_id = deck.id;
        let card = Flashcard::new(CardInput::new("France", "Paris"));
        let card_id = card.id;

        let state = reduce(FlashcardState::default(), FlashcardAction::AddDeck(deck));
        let state = reduce(state, FlashcardAction::SetCurrentDeck(Some(deck_id)));
        let state = reduce(state, FlashcardAction::AddFlashcard {
            deck_id,
            flashcard: card.clone(),
        });
        assert_eq!(state.current_deck().unwrap().flashcards, vec![card.clone()]);

        let edited = Flashcard {
            back: "Paris, Île-de-France".to_string(),
            ..card
        };
        let state = reduce(state, FlashcardAction::UpdateFlashcard {
            deck_id,
            flashcard: edited.clone(),
        });
        assert_eq!(state.deck(deck_id).unwrap().card(card_id), Some(&edited));

        let state = reduce(state, FlashcardAction::UpdateFlashcardStats {
            deck_id,
            flashcard_id: card_id,
            correct: false,
            at: Utc::now(),
        });
        assert_eq!(state.deck(deck_id).unwrap().times_incorrect(), 1);

        let state = reduce(state, FlashcardAction::DeleteFlashcard {
            deck_id,
            flashcard_id: card_id,
        });
        assert!(state.deck(deck_id).unwrap().is_empty());

        let state = reduce(state, FlashcardAction::DeleteDeck(deck_id));
        assert!(state.decks.is_empty());
        assert_eq!(state.current_deck_id, None);
    }

    #[test]
    fn test_reducer_filters_user_decks() {
        let alice = Deck::new("alice".to_string(), DeckInput::new("Capitals", ""));
        let bob = Deck::new("bob".to_string(), DeckInput::new("Verbs", ""));

        let state = reduce(FlashcardState::default(), FlashcardAction::SetUserDecks {
            decks: vec![alice.clone(), bob],
            user_id: "alice".to_string(),
        });
        assert_eq!(state.decks, vec![alice]);

        let state = reduce(state, FlashcardAction::ToggleTheme);
        assert_eq!(state.theme, Theme::Dark);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_deck_requires_user() {
        let (mut controller, _store, _kv) = setup();
        let err = controller.create_deck(&DeckInput::new("Capitals", "")).unwrap_err();
        assert!(matches!(err, DeckError::NotSignedIn));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_invalid_input() {
        let (mut controller, _store, _kv) = setup();
        controller.load_user_decks("alice");

        let err = controller.create_deck(&DeckInput::new("  ", "")).unwrap_err();
        assert!(matches!(
            err,
            DeckError::Validation(ValidationError::Required { field: "Deck name" })
        ));

        let deck = controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        let err = controller
            .add_card(deck.id, &CardInput::new("France", ""))
            .unwrap_err();
        assert!(matches!(err, DeckError::Validation(_)));
        assert!(matches!(
            controller.add_card(Uuid::new_v4(), &CardInput::new("a", "b")),
            Err(DeckError::DeckNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_auto_save_leaves_last_saved_unset() {
        let kv = Arc::new(MemoryStorage::with_quota(16));
        let store = DeckStore::new(kv.clone());
        let mut controller =
            FlashcardController::new(store.clone(), PreferenceStore::new(kv), QUIET);
        controller.load_user_decks("alice");

        controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        assert!(controller.is_auto_saving());

        settle().await;
        assert!(!controller.is_auto_saving());
        assert_eq!(controller.last_saved(), None);
        assert!(store.load_all_decks().is_empty());
        assert_eq!(controller.decks().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_are_saved_after_quiet_period() {
        let (mut controller, store, _kv) = setup();
        controller.load_user_decks("alice");

        let deck = controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        controller.add_card(deck.id, &CardInput::new("France", "Paris")).unwrap();
        controller.add_card(deck.id, &CardInput::new("Spain", "Madrid")).unwrap();

        assert!(controller.is_auto_saving());
        assert!(store.load_all_decks().is_empty());

        settle().await;
        assert!(!controller.is_auto_saving());
        assert!(controller.last_saved().is_some());

        let stored = store.get_deck(deck.id).unwrap();
        assert_eq!(stored.flashcards.len(), 2);
        assert_eq!(&stored, controller.deck(deck.id).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_users_decks_survive_saves() {
        let (mut controller, store, _kv) = setup();
        let bob = Deck::new("bob".to_string(), DeckInput::new("Verbs", ""));
        store.save_decks(&[bob.clone()]).unwrap();

        controller.load_user_decks("alice");
        assert!(controller.decks().is_empty());
        controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        settle().await;

        let all = store.load_all_decks();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&bob));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_deck_removes_from_storage() {
        let (mut controller, store, _kv) = setup();
        controller.load_user_decks("alice");

        let doomed = controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        let kept = controller.create_deck(&DeckInput::new("Rivers", "")).unwrap();
        controller.flush().await;
        assert_eq!(store.load_all_decks().len(), 2);

        controller.add_card(doomed.id, &CardInput::new("France", "Paris")).unwrap();
        controller.delete_deck(doomed.id).await.unwrap();
        settle().await;

        let all = store.load_all_decks();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, kept.id);
        assert!(matches!(
            controller.delete_deck(doomed.id).await,
            Err(DeckError::DeckNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_and_delete_card() {
        let (mut controller, _store, _kv) = setup();
        controller.load_user_decks("alice");
        let deck = controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        let card = controller.add_card(deck.id, &CardInput::new("France", "Paris")).unwrap();

        let edited = controller
            .edit_card(deck.id, card.id, &CardInput::new(" France ", " Paris, FR "))
            .unwrap();
        assert_eq!(edited.back, "Paris, FR");
        assert_eq!(edited.id, card.id);

        controller.delete_card(deck.id, card.id).unwrap();
        assert!(controller.deck(deck.id).unwrap().is_empty());
        assert!(matches!(
            controller.delete_card(deck.id, card.id),
            Err(DeckError::CardNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_creating_clears_drafts() {
        let (mut controller, _store, kv) = setup();
        let prefs = PreferenceStore::new(kv.clone());
        prefs.save_deck_draft(&crate::preferences::DeckDraft {
            name: "Capi".to_string(),
            description: String::new(),
        });

        controller.load_user_decks("alice");
        controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        assert_eq!(kv.get(keys::DECK_DRAFT).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_theme_persists() {
        let (mut controller, _store, kv) = setup();
        assert_eq!(controller.toggle_theme(), Theme::Dark);
        assert_eq!(kv.get(keys::THEME).unwrap().as_deref(), Some("\"dark\""));

        let reopened = FlashcardController::new(
            DeckStore::new(kv.clone()),
            PreferenceStore::new(kv),
            QUIET,
        );
        assert_eq!(reopened.theme(), Theme::Dark);
    }

    #[tokio::test(start_paused = true)]
    async fn test_study_answers_update_tallies() {
        let (mut controller, store, _kv) = setup();
        controller.load_user_decks("alice");
        let deck = controller.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        controller.add_card(deck.id, &CardInput::new("France", "Paris")).unwrap();

        let mut session = StudySession::new(controller.deck(deck.id).unwrap()).unwrap();
        session.flip();
        assert!(matches!(session.answer(true, &mut controller), AnswerOutcome::Completed));

        let updated = controller.deck(deck.id).unwrap();
        assert_eq!(updated.times_correct(), 1);
        assert!(updated.last_studied.is_some());
        assert_eq!(controller.stats().studied_decks, 1);

        controller.shutdown().await;
        assert_eq!(store.get_deck(deck.id).unwrap().times_correct(), 1);
    }
}
