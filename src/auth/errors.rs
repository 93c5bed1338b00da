//! Authentication error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Another user already has this email (case-insensitive)
    #[error("Email already in use")]
    DuplicateEmail,

    /// Password shorter than the minimum length
    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// Unknown email or wrong password; deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    /// Display name too short
    #[error("Name must be at least {min} characters")]
    InvalidName { min: usize },

    #[error("Invalid email address")]
    InvalidEmail,

    /// The user collection could not be written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl AuthError {
    /// Message safe to show the user. Storage details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::StorageUnavailable(_) => {
                "Could not save your changes, local storage is unavailable".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
