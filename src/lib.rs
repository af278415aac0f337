//! Estate Accounts Library
//!
//! User accounts for the real-estate site: registration, the active session,
//! profile edits, favorite properties and per-user notifications, persisted
//! into a pluggable key-value substrate.

pub mod config;
pub mod navigation;
pub mod notifications;
pub mod storage;
pub mod user;

// Re-export commonly used types for convenience
pub use navigation::{LoggingNavigator, Navigator, HOME_SCREEN};
pub use notifications::{Locale, NewNotification, Notification};
pub use storage::{JsonFileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use user::{
    AuthOutcome, ErrorKind, ProfileUpdate, Registration, UserStore, UserStoreError,
    UserStoreSettings, UserView,
};
