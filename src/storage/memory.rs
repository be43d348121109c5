//! In-memory key-value store.

use super::{KeyValueStore, StorageError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Key-value store that lives only as long as the process.
///
/// Used as the test double for the durable stores and as the fallback when
/// no data directory is available. It can be switched to an unavailable
/// state to simulate a full or disabled browser store.
#[derive(Debug)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggles whether reads and writes succeed.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        let values = self
            .values
            .read()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut values = self
            .values
            .write()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut values = self
            .values
            .write()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("2".to_string()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set_available(false);

        assert!(store.get("a").is_err());
        assert!(store.set("a", "2").is_err());

        store.set_available(true);
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
    }
}
