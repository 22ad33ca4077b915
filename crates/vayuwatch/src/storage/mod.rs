//! Key/value persistence for account data.
//!
//! Account state is stored as whole serialized blobs under a handful of string
//! keys, the same shape a browser's local storage would give. The
//! [`KeyValueStore`] trait is the seam: [`SqliteStore`] persists to disk and
//! [`MemoryStore`] keeps everything in process for tests and throwaway runs.

pub mod migrations;
pub mod schema;
mod sqlite;

use std::collections::HashMap;

pub use sqlite::SqliteStore;

use crate::error::Result;

/// A string key/value store.
///
/// Every write replaces the whole value; there are no transactions or
/// compare-and-swap semantics. Two writers racing on one key lose updates.
pub trait KeyValueStore {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium rejects the delete.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store backed by a `HashMap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
