//! Key-value persistence shared by every store.
//!
//! Values are JSON documents addressed by a fixed set of string keys,
//! the same layout a browser's local storage would hold.

mod file_storage;
pub mod keys;
mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use file_storage::{FileStorage, Result, StorageError, DEFAULT_QUOTA_BYTES};
pub use memory::MemoryStorage;

/// A flat string-keyed store of JSON strings
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the whole value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key succeeds
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and deserialize a typed value. A value that does not match the
/// expected shape is an error, never a partially revived record.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(content) => Ok(Some(serde_json::from_str(&content)?)),
        None => Ok(None),
    }
}

pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let content = serde_json::to_string(value)?;
    store.set(key, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_mismatch_is_error() {
        let store = MemoryStorage::new();
        store.set(keys::USERS, "{\"not\": \"a list\"}").unwrap();

        let result: Result<Option<Vec<u32>>> = read_json(&store, keys::USERS);
        assert!(matches!(result, Err(StorageError::Json(_))));
    }

    #[test]
    fn test_write_then_read_json() {
        let store = MemoryStorage::new();
        write_json(&store, keys::DECKS, &vec![1, 2, 3]).unwrap();

        let values: Option<Vec<u32>> = read_json(&store, keys::DECKS).unwrap();
        assert_eq!(values, Some(vec![1, 2, 3]));
    }
}
