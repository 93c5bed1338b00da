//! User collection persisted under a single storage key.
//!
//! Reads never fail: a missing or unreadable collection is logged and read
//! as empty. Writes report failure so callers can surface it.

use std::sync::Arc;

use super::models::{StoredUser, User};
use crate::storage::{self, keys, KeyValueStore, StorageError};

#[derive(Clone)]
pub struct UserStore {
    kv: Arc<dyn KeyValueStore>,
}

impl UserStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Every stored user, or an empty list if nothing readable is stored
    pub fn list_users(&self) -> Vec<StoredUser> {
        match storage::read_json::<Vec<StoredUser>>(self.kv.as_ref(), keys::USERS) {
            Ok(users) => users.unwrap_or_default(),
            Err(e) => {
                log::error!("Failed to load users: {}", e);
                Vec::new()
            }
        }
    }

    /// Overwrite the whole collection in one write
    pub fn save_users(&self, users: &[StoredUser]) -> Result<(), StorageError> {
        storage::write_json(self.kv.as_ref(), keys::USERS, users).map_err(|e| {
            log::error!("Failed to save users: {}", e);
            e
        })
    }

    /// Look up a user by id, password stripped
    pub fn get_user_by_id(&self, id: &str) -> Option<User> {
        self.list_users()
            .into_iter()
            .find(|u| u.user.id == id)
            .map(|u| u.sanitized())
    }

    /// Find a stored user by email, ignoring case
    pub fn find_by_email(&self, email: &str) -> Option<StoredUser> {
        self.list_users().into_iter().find(|u| u.email_matches(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::Utc;

    fn stored(id: &str, email: &str) -> StoredUser {
        StoredUser {
            user: User {
                id: id.to_string(),
                email: email.to_string(),
                name: format!("User {}", id),
                created_at: Utc::now(),
                last_login: Utc::now(),
                avatar: None,
            },
            password: "digest".to_string(),
        }
    }

    fn create_test_store() -> (UserStore, Arc<MemoryStorage>) {
        let kv = Arc::new(MemoryStorage::new());
        (UserStore::new(kv.clone()), kv)
    }

    #[test]
    fn test_empty_when_nothing_stored() {
        let (store, _kv) = create_test_store();
        assert!(store.list_users().is_empty());
        assert!(store.get_user_by_id("u1").is_none());
    }

    #[test]
    fn test_corrupt_collection_reads_empty() {
        let (store, kv) = create_test_store();
        kv.set(keys::USERS, "not json").unwrap();
        assert!(store.list_users().is_empty());

        kv.set(keys::USERS, r#"[{"id": "u1"}]"#).unwrap();
        assert!(store.list_users().is_empty());
    }

    #[test]
    fn test_save_and_lookup() {
        let (store, _kv) = create_test_store();
        store
            .save_users(&[stored("u1", "a@example.com"), stored("u2", "b@example.com")])
            .unwrap();

        assert_eq!(store.list_users().len(), 2);

        let user = store.get_user_by_id("u2").unwrap();
        assert_eq!(user.email, "b@example.com");

        let found = store.find_by_email("A@EXAMPLE.COM").unwrap();
        assert_eq!(found.user.id, "u1");
    }

    #[test]
    fn test_save_failure_is_reported() {
        let kv = Arc::new(MemoryStorage::with_quota(8));
        let store = UserStore::new(kv);
        let result = store.save_users(&[stored("u1", "a@example.com")]);
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
        assert!(store.list_users().is_empty());
    }
}
