//! Application state: who is signed in and which decks they hold.
//!
//! [`Flashdeck`] wires the stores to one key-value backend and keeps the
//! deck state in step with the auth state.

pub mod auth_state;
pub mod flashcard_state;

use std::sync::Arc;

pub use auth_state::{AuthAction, AuthController, AuthState};
pub use flashcard_state::{FlashcardAction, FlashcardController, FlashcardState};

use crate::auth::session::SessionManager;
use crate::auth::user_storage::UserStore;
use crate::auth::{AuthResult, AuthService, LoginRequest, RegisterRequest, User};
use crate::config::AppConfig;
use crate::flashcards::DeckStore;
use crate::preferences::PreferenceStore;
use crate::storage::KeyValueStore;

pub struct Flashdeck {
    pub auth: AuthController,
    pub flashcards: FlashcardController,
    pub preferences: PreferenceStore,
}

impl Flashdeck {
    /// Build controllers over `kv`. Must be called inside a tokio runtime.
    pub fn new(kv: Arc<dyn KeyValueStore>, config: &AppConfig) -> Self {
        let users = UserStore::new(Arc::clone(&kv));
        let sessions =
            SessionManager::new(Arc::clone(&kv), users).with_duration(config.session_duration());
        let service = AuthService::new(Arc::clone(&kv))
            .with_sessions(sessions)
            .with_latency(config.auth_latency());

        let preferences = PreferenceStore::new(Arc::clone(&kv));
        let flashcards = FlashcardController::new(
            DeckStore::new(kv),
            preferences.clone(),
            config.autosave_debounce(),
        );

        Self {
            auth: AuthController::new(service),
            flashcards,
            preferences,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    /// Resume a stored session and load that user's decks
    pub fn restore_session(&mut self) -> Option<User> {
        let user = self.auth.restore().cloned()?;
        self.flashcards.load_user_decks(&user.id);
        Some(user)
    }

    pub async fn login(&mut self, request: LoginRequest) -> AuthResult<User> {
        let user = self.auth.login(request).await?;
        self.flashcards.load_user_decks(&user.id);
        Ok(user)
    }

    pub async fn register(&mut self, request: RegisterRequest) -> AuthResult<User> {
        let user = self.auth.register(request).await?;
        self.flashcards.load_user_decks(&user.id);
        Ok(user)
    }

    /// Save pending deck edits, then end the session
    pub async fn logout(&mut self) {
        self.flashcards.unload().await;
        self.auth.logout();
    }

    /// Write anything still pending before the process exits
    pub async fn shutdown(self) {
        self.flashcards.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::DeckInput;
    use crate::storage::MemoryStorage;

    fn alice() -> RegisterRequest {
        RegisterRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_decks_follow_the_signed_in_user() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let config = AppConfig::default();

        let mut app = Flashdeck::new(Arc::clone(&kv), &config);
        app.register(alice()).await.unwrap();
        app.flashcards.create_deck(&DeckInput::new("Capitals", "")).unwrap();
        app.logout().await;
        assert!(app.flashcards.decks().is_empty());

        app.login(LoginRequest {
            email: "demo@example.com".to_string(),
            password: "demo123".to_string(),
        })
        .await
        .unwrap();
        assert!(app.flashcards.decks().is_empty());
        app.shutdown().await;

        let mut reopened = Flashdeck::new(kv, &config);
        let user = reopened.restore_session().unwrap();
        assert_eq!(user.email, "demo@example.com");

        reopened.logout().await;
        assert!(reopened.restore_session().is_none());
        reopened
            .login(LoginRequest {
                email: "ALICE@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(reopened.flashcards.decks().len(), 1);
    }
}
