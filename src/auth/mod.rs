//! Local accounts: user collection, password digests and sessions.
//!
//! This module provides:
//! - A user store persisted under one storage key
//! - Registration, login and profile updates returning sanitized users
//! - A seven-day session record with lazy expiry
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use flashdeck_lib::auth::{AuthService, RegisterRequest};
//! use flashdeck_lib::storage::MemoryStorage;
//!
//! #[tokio::main]
//! async fn main() {
//!     let auth = AuthService::new(Arc::new(MemoryStorage::new()));
//!     let user = auth
//!         .register(RegisterRequest {
//!             name: "Alice".to_string(),
//!             email: "alice@example.com".to_string(),
//!             password: "secret1".to_string(),
//!         })
//!         .await
//!         .unwrap();
//!     auth.sessions().save_session(&user).unwrap();
//! }
//! ```

pub mod errors;
pub mod models;
pub mod password;
pub mod service;
pub mod session;
pub mod user_storage;

pub use errors::{AuthError, AuthResult};
pub use models::{
    AuthResponse, LoginRequest, ProfileUpdate, RegisterRequest, Session, StoredUser, User, UserId,
};
pub use service::AuthService;
pub use session::SessionManager;
pub use user_storage::UserStore;
