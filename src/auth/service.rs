//! Registration, login and profile updates over the user collection.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::errors::{AuthError, AuthResult};
use super::models::{LoginRequest, ProfileUpdate, RegisterRequest, StoredUser, User};
use super::password::{hash_password, verify_password};
use super::session::SessionManager;
use super::user_storage::UserStore;
use crate::storage::KeyValueStore;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_NAME_LENGTH: usize = 2;

/// Demo account created on the first login attempt if it is missing
pub const DEMO_USER_ID: &str = "demo-user-id";
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo123";
const DEMO_NAME: &str = "Demo User";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: UserStore,
    sessions: SessionManager,
    latency: Duration,
}

impl AuthService {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let users = UserStore::new(kv.clone());
        let sessions = SessionManager::new(kv, users.clone());
        Self {
            users,
            sessions,
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency`, standing in for a network round trip
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_sessions(mut self, sessions: SessionManager) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidName` - Name shorter than two characters
    /// * `AuthError::InvalidEmail` - Email without `@`
    /// * `AuthError::DuplicateEmail` - Email already registered, any case
    /// * `AuthError::WeakPassword` - Password shorter than six characters
    /// * `AuthError::StorageUnavailable` - User collection could not be written
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        self.simulate_latency().await;

        let name = request.name.trim();
        let email = request.email.trim();
        validate_name(name)?;
        validate_email(email)?;

        let mut users = self.users.list_users();
        if users.iter().any(|u| u.email_matches(email)) {
            return Err(AuthError::DuplicateEmail);
        }

        validate_password(&request.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
            last_login: now,
            avatar: None,
        };

        users.push(StoredUser {
            user: user.clone(),
            password: hash_password(&request.password),
        });
        self.users.save_users(&users)?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Log a user in by email and password
    ///
    /// Unknown email and wrong password both yield
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, request: LoginRequest) -> AuthResult<User> {
        self.simulate_latency().await;

        self.ensure_demo_user();

        let mut users = self.users.list_users();
        let stored = users
            .iter_mut()
            .find(|u| u.email_matches(request.email.trim()))
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &stored.password) {
            return Err(AuthError::InvalidCredentials);
        }

        stored.user.last_login = Utc::now();
        let user = stored.sanitized();
        self.users.save_users(&users)?;

        log::info!("User {} logged in", user.id);
        Ok(user)
    }

    /// Change the supplied profile fields of `user_id`
    ///
    /// Blank fields count as not supplied.
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> AuthResult<User> {
        self.simulate_latency().await;

        let name = update.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let email = update.email.as_deref().map(str::trim).filter(|e| !e.is_empty());

        let mut users = self.users.list_users();
        let index = users
            .iter()
            .position(|u| u.user.id == user_id)
            .ok_or(AuthError::UserNotFound)?;

        if let Some(email) = email {
            validate_email(email)?;
            if users.iter().any(|u| u.user.id != user_id && u.email_matches(email)) {
                return Err(AuthError::DuplicateEmail);
            }
        }
        if let Some(name) = name {
            validate_name(name)?;
        }

        let stored = &mut users[index];
        if let Some(name) = name {
            stored.user.name = name.to_string();
        }
        if let Some(email) = email {
            stored.user.email = email.to_string();
        }
        let user = stored.sanitized();
        self.users.save_users(&users)?;

        Ok(user)
    }

    /// Insert the demo account if no user owns its email yet
    fn ensure_demo_user(&self) {
        let mut users = self.users.list_users();
        if users.iter().any(|u| u.email_matches(DEMO_EMAIL)) {
            return;
        }

        let created_at = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        users.push(StoredUser {
            user: User {
                id: DEMO_USER_ID.to_string(),
                email: DEMO_EMAIL.to_string(),
                name: DEMO_NAME.to_string(),
                created_at,
                last_login: Utc::now(),
                avatar: None,
            },
            password: hash_password(DEMO_PASSWORD),
        });

        if self.users.save_users(&users).is_ok() {
            log::info!("Created demo user");
        }
    }
}

/// Lengths count UTF-16 code units, matching existing browser-created accounts
fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

fn validate_name(name: &str) -> AuthResult<()> {
    if text_length(name) < MIN_NAME_LENGTH {
        return Err(AuthError::InvalidName { min: MIN_NAME_LENGTH });
    }
    Ok(())
}

fn validate_email(email: &str) -> AuthResult<()> {
    if !email.contains('@') {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}

fn validate_password(password: &str) -> AuthResult<()> {
    if text_length(password) < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn create_test_service() -> AuthService {
        AuthService::new(Arc::new(MemoryStorage::new()))
    }

    fn register_request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let auth = create_test_service();

        let user = auth
            .register(register_request("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");

        let stored = auth.users().find_by_email("alice@example.com").unwrap();
        assert_eq!(stored.password, hash_password("secret1"));

        let logged_in = auth
            .login(login_request("alice@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(logged_in.last_login >= user.last_login);

        let err = auth
            .login(login_request("alice@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_email_any_case() {
        let auth = create_test_service();
        auth.register(register_request("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let err = auth
            .register(register_request("Other", "ALICE@Example.com", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(auth.users().list_users().len(), 1);
    }

    #[tokio::test]
    async fn test_weak_password() {
        let auth = create_test_service();
        let err = auth
            .register(register_request("Alice", "alice@example.com", "12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword { min: 6 }));
        assert!(auth.users().list_users().is_empty());
    }

    #[tokio::test]
    async fn test_register_form_validation() {
        let auth = create_test_service();
        let err = auth
            .register(register_request(" A ", "alice@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidName { .. }));

        let err = auth
            .register(register_request("Alice", "alice.example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail));
    }

    #[tokio::test]
    async fn test_unknown_email_is_invalid_credentials() {
        let auth = create_test_service();
        let err = auth
            .login(login_request("nobody@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_demo_user_created_lazily() {
        let auth = create_test_service();
        assert!(auth.users().list_users().is_empty());

        let user = auth
            .login(login_request(DEMO_EMAIL, DEMO_PASSWORD))
            .await
            .unwrap();
        assert_eq!(user.id, DEMO_USER_ID);

        // A second attempt does not duplicate it
        auth.login(login_request("nobody@example.com", "x")).await.unwrap_err();
        assert_eq!(auth.users().list_users().len(), 1);
    }

    #[tokio::test]
    async fn test_registered_demo_email_blocks_second_demo_record() {
        let auth = create_test_service();
        auth.register(register_request("Impostor", "Demo@Example.com", "secret1"))
            .await
            .unwrap();

        auth.login(login_request("x@y.z", "whatever")).await.unwrap_err();
        auth.login(login_request(DEMO_EMAIL, DEMO_PASSWORD)).await.unwrap_err();

        let matching: Vec<_> = auth
            .users()
            .list_users()
            .into_iter()
            .filter(|u| u.email_matches(DEMO_EMAIL))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].user.name, "Impostor");

        let user = auth
            .login(login_request("demo@example.com", "secret1"))
            .await
            .unwrap();
        assert_ne!(user.id, DEMO_USER_ID);
    }

    #[tokio::test]
    async fn test_password_length_counts_utf16_units() {
        let auth = create_test_service();
        // Three astral characters are six UTF-16 units
        auth.register(register_request("Alice", "alice@example.com", "\u{1F600}\u{1F600}\u{1F600}"))
            .await
            .unwrap();

        let err = auth
            .register(register_request("Bob", "bob@example.com", "\u{1F600}\u{1F600}a"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword { min: 6 }));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let auth = create_test_service();
        let alice = auth
            .register(register_request("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();
        auth.register(register_request("Bob", "bob@example.com", "secret2"))
            .await
            .unwrap();

        let err = auth
            .update_profile(
                &alice.id,
                ProfileUpdate {
                    name: None,
                    email: Some("BOB@example.com".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));

        // Keeping your own email in another case is allowed
        let updated = auth
            .update_profile(
                &alice.id,
                ProfileUpdate {
                    name: Some("Alice Smith".to_string()),
                    email: Some("ALICE@example.com".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alice Smith");
        assert_eq!(updated.email, "ALICE@example.com");

        let renamed = auth
            .update_profile(
                &alice.id,
                ProfileUpdate {
                    name: Some("Al".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.email, "ALICE@example.com");
        assert_eq!(auth.users().get_user_by_id(&alice.id), Some(renamed));
    }

    #[tokio::test]
    async fn test_update_profile_unknown_user() {
        let auth = create_test_service();
        let err = auth
            .update_profile("missing", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let auth = AuthService::new(Arc::new(MemoryStorage::with_quota(16)));
        let err = auth
            .register(register_request("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::StorageUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_awaited() {
        let auth = create_test_service().with_latency(Duration::from_millis(800));
        let started = tokio::time::Instant::now();

        auth.register(register_request("Alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(800));
    }
}
