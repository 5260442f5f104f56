//! Authentication state for the admin client.
//!
//! This module provides:
//! - `SessionStore`: token, identity and permissions with automatic expiry
//! - `InactivityTimer`: the single deferred logout action
//! - `SessionStorage`: persisted key-value backends (file, keyring, memory)
//!
//! Sessions are persisted on every change and expire after 30 minutes
//! without user activity.

pub mod identity;
pub mod keyring_store;
pub mod session;
pub mod storage;
pub mod timer;

pub use identity::{Identity, PermissionSet};
pub use keyring_store::KeyringStorage;
pub use session::{SessionState, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use timer::{InactivityTimer, INACTIVITY_TIMEOUT};
