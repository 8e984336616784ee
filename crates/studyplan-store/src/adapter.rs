//! Primary/secondary persistence adapter.
//!
//! Wraps two [`KvStore`] backends. Writes try the primary first and degrade
//! to the secondary (with a warning) on failure; reads mirror that order.
//! Nothing here ever panics or surfaces an error to engine callers: total
//! failure on read yields the caller's default, and total failure on write
//! returns `false` so the hub can log it and carry on with in-memory state.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::kv::{KvStore, MemoryStore};

/// A primary KV store with a transient secondary fallback.
pub struct PersistenceAdapter {
    primary: Box<dyn KvStore>,
    secondary: Box<dyn KvStore>,
}

impl PersistenceAdapter {
    /// Build an adapter over the given backends.
    #[must_use]
    pub fn new(primary: Box<dyn KvStore>, secondary: Box<dyn KvStore>) -> Self {
        Self { primary, secondary }
    }

    /// Adapter over two in-memory stores (tests, ephemeral hosts).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    /// Serialize `value` as JSON and write it under `key`.
    ///
    /// Returns `true` iff at least one backend accepted the write.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(text) => self.save_raw(key, &text),
            Err(e) => {
                warn!(key, error = %e, "failed to serialize value; nothing written");
                false
            }
        }
    }

    /// Write a pre-serialized value under `key`.
    pub fn save_raw(&mut self, key: &str, text: &str) -> bool {
        match self.primary.put(key, text) {
            Ok(()) => true,
            Err(primary_err) => {
                warn!(key, error = %primary_err, "primary store write failed; trying secondary");
                match self.secondary.put(key, text) {
                    Ok(()) => true,
                    Err(secondary_err) => {
                        warn!(key, error = %secondary_err, "secondary store write failed; value not persisted");
                        false
                    }
                }
            }
        }
    }

    /// Load and deserialize the value under `key`, returning `default` when
    /// the key is absent, unreadable, or unparseable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(text) = self.load_raw(key) else {
            return default;
        };
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored value failed to parse; using default");
                default
            }
        }
    }

    /// Read the raw value under `key`, trying primary then secondary.
    #[must_use]
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.primary.get(key) {
            Ok(Some(text)) => return Some(text),
            Ok(None) => {}
            Err(e) => warn!(key, error = %e, "primary store read failed; trying secondary"),
        }
        match self.secondary.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "secondary store read failed");
                None
            }
        }
    }

    /// Remove `key` from both backends. Returns `true` iff neither errored.
    pub fn remove(&mut self, key: &str) -> bool {
        let mut ok = true;
        if let Err(e) = self.primary.remove(key) {
            warn!(key, error = %e, "primary store remove failed");
            ok = false;
        }
        if let Err(e) = self.secondary.remove(key) {
            warn!(key, error = %e, "secondary store remove failed");
            ok = false;
        }
        ok
    }

    /// Keys present in either backend, deduplicated.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys = match self.primary.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "primary store key listing failed");
                Vec::new()
            }
        };
        match self.secondary.keys() {
            Ok(extra) => {
                for key in extra {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
            Err(e) => warn!(error = %e, "secondary store key listing failed"),
        }
        keys
    }

    /// Whether `key` exists in either backend.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.load_raw(key).is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Result, StoreError};

    /// Backend that refuses every operation, for fallback tests.
    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Err(StoreError::Unavailable(key.to_string()))
        }
        fn put(&mut self, key: &str, _value: &str) -> Result<()> {
            Err(StoreError::Unavailable(key.to_string()))
        }
        fn remove(&mut self, key: &str) -> Result<()> {
            Err(StoreError::Unavailable(key.to_string()))
        }
        fn keys(&self) -> Result<Vec<String>> {
            Err(StoreError::Unavailable("keys".to_string()))
        }
    }

    #[test]
    fn save_load_through_primary() {
        let mut adapter = PersistenceAdapter::in_memory();
        assert!(adapter.save("k", &vec![1, 2, 3]));
        let loaded: Vec<i32> = adapter.load("k", Vec::new());
        assert_eq!(loaded, vec![1, 2, 3]);
    }

    #[test]
    fn write_falls_back_to_secondary() {
        let mut adapter =
            PersistenceAdapter::new(Box::new(BrokenStore), Box::new(MemoryStore::new()));
        assert!(adapter.save("k", &42));
        let loaded: i32 = adapter.load("k", 0);
        assert_eq!(loaded, 42);
    }

    #[test]
    fn total_write_failure_returns_false() {
        let mut adapter = PersistenceAdapter::new(Box::new(BrokenStore), Box::new(BrokenStore));
        assert!(!adapter.save("k", &42));
    }

    #[test]
    fn read_failure_yields_default() {
        let adapter = PersistenceAdapter::new(Box::new(BrokenStore), Box::new(BrokenStore));
        let loaded: i32 = adapter.load("k", 7);
        assert_eq!(loaded, 7);
    }

    #[test]
    fn unparseable_value_yields_default() {
        let mut adapter = PersistenceAdapter::in_memory();
        assert!(adapter.save_raw("k", "not json"));
        let loaded: Vec<i32> = adapter.load("k", vec![9]);
        assert_eq!(loaded, vec![9]);
    }

    #[test]
    fn absent_key_yields_default() {
        let adapter = PersistenceAdapter::in_memory();
        let loaded: Option<String> = adapter.load("missing", None);
        assert_eq!(loaded, None);
        assert!(!adapter.contains("missing"));
    }

    #[test]
    fn keys_union_both_backends() {
        let mut primary = MemoryStore::new();
        primary.put("a", "1").unwrap();
        primary.put("b", "2").unwrap();
        let mut secondary = MemoryStore::new();
        secondary.put("b", "2").unwrap();
        secondary.put("c", "3").unwrap();

        let adapter = PersistenceAdapter::new(Box::new(primary), Box::new(secondary));
        let mut keys = adapter.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn remove_clears_both_backends() {
        let mut primary = MemoryStore::new();
        primary.put("k", "1").unwrap();
        let mut secondary = MemoryStore::new();
        secondary.put("k", "1").unwrap();

        let mut adapter = PersistenceAdapter::new(Box::new(primary), Box::new(secondary));
        assert!(adapter.remove("k"));
        assert!(!adapter.contains("k"));
    }
}
