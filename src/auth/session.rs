//! Time-limited session binding this data directory to one user.
//!
//! Expiry is lazy: an expired, orphaned or unreadable session is deleted
//! the next time it is read.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::models::{Session, User};
use super::user_storage::UserStore;
use crate::storage::{self, keys, KeyValueStore, StorageError};

/// Default session lifetime in days
pub const DEFAULT_SESSION_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SessionManager {
    kv: Arc<dyn KeyValueStore>,
    users: UserStore,
    duration: Duration,
}

impl SessionManager {
    pub fn new(kv: Arc<dyn KeyValueStore>, users: UserStore) -> Self {
        Self {
            kv,
            users,
            duration: Duration::days(DEFAULT_SESSION_DAYS),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Start (or extend) a session for `user`. Expiry saturates at the
    /// latest representable time.
    pub fn save_session(&self, user: &User) -> Result<Session, StorageError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = Session {
            user_id: user.id.clone(),
            expires_at,
        };

        storage::write_json(self.kv.as_ref(), keys::SESSION, &session).map_err(|e| {
            log::error!("Failed to save session: {}", e);
            e
        })?;
        Ok(session)
    }

    /// The signed-in user, if the stored session is still valid
    pub fn get_session(&self) -> Option<User> {
        let session = match storage::read_json::<Session>(self.kv.as_ref(), keys::SESSION) {
            Ok(Some(session)) => session,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Failed to get session: {}", e);
                self.clear_session();
                return None;
            }
        };

        if session.is_expired_at(Utc::now()) {
            log::info!("Session for user {} expired", session.user_id);
            self.clear_session();
            return None;
        }

        match self.users.get_user_by_id(&session.user_id) {
            Some(user) => Some(user),
            None => {
                log::warn!("Session references missing user {}", session.user_id);
                self.clear_session();
                None
            }
        }
    }

    /// Delete the session record. Idempotent.
    pub fn clear_session(&self) {
        if let Err(e) = self.kv.remove(keys::SESSION) {
            log::error!("Failed to clear session: {}", e);
        }
    }
}
