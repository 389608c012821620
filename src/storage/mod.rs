//! Key-value persistence for progress, learner state and query history
//!
//! Values are opaque JSON blobs addressed by string keys. Reads that fail or
//! hold corrupt data fall back to defaults; callers never see a broken blob.
//!
//! Components:
//! - MemoryStore: in-process map, used by tests and ephemeral sessions
//! - FileStore: one JSON file per key under a state directory
//! - QueryHistory: per-user list of past queries

pub mod file;
pub mod history;

pub use file::FileStore;
pub use history::{HistoryEntry, QueryHistory};

use crate::errors::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Key for the user progress blob
pub const PROGRESS_KEY: &str = "codesensei-progress";

/// Key for the learner snapshot (model + training log)
pub const LEARNER_KEY: &str = "codesensei-ml-data";

/// Key for a user's query history
pub fn history_key(user: &str) -> String {
    format!("codesensei-history-{}", user)
}

/// String-keyed blob store
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; absent keys are not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

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

/// Load and decode a blob, substituting the default on any failure
pub fn load_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding corrupt data under '{}': {}", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Failed to read '{}': {}", key, e);
            T::default()
        }
    }
}

/// Encode and write a blob
pub fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::UserProgress;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert!(store.is_empty());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_load_or_default_recovers_from_corruption() {
        let mut store = MemoryStore::new();
        store.set(PROGRESS_KEY, "{not json").unwrap();

        let progress: UserProgress = load_or_default(&store, PROGRESS_KEY);
        assert_eq!(progress, UserProgress::default());
    }

    #[test]
    fn test_load_or_default_missing_key() {
        let store = MemoryStore::new();
        let progress: UserProgress = load_or_default(&store, PROGRESS_KEY);
        assert_eq!(progress.total_questions, 0);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut progress = UserProgress::new();
        progress.total_questions = 4;

        save_json(&mut store, PROGRESS_KEY, &progress).unwrap();
        let loaded: UserProgress = load_or_default(&store, PROGRESS_KEY);
        assert_eq!(loaded.total_questions, 4);
    }

    #[test]
    fn test_history_key_format() {
        assert_eq!(history_key("guest"), "codesensei-history-guest");
    }
}
