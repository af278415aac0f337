//! Durable key-value substrate the account store persists into.
//!
//! The account layer only ever needs a handful of string documents addressed
//! by fixed keys, so every backend exposes the same tiny surface. Values are
//! opaque to the backend; parsing happens in the account store.

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

use anyhow::Result;

pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    /// Returns Ok(None) if the key is not present.
    /// Returns Err if the backend could not be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Returns all stored keys in ascending order.
    fn keys(&self) -> Result<Vec<String>>;
}
