//! Durable key-value storage for history, settings and the audit log.
//!
//! Each record type owns one key and stores a single JSON document under it.
//! The stores above this layer treat every error here as recoverable: a
//! missing or corrupt value reads as "nothing stored" and a failed write
//! leaves the in-memory state authoritative for the rest of the session.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt;

/// Storage key for the search history list.
pub const HISTORY_KEY: &str = "medlit.history.v1";

/// Storage key for the user settings record.
pub const SETTINGS_KEY: &str = "medlit.settings.v1";

/// Storage key for the audit event log.
pub const AUDIT_KEY: &str = "medlit.audit.v1";

/// A durable string key-value store scoped to one user profile.
///
/// Implementations must be cheap to call from a single thread; no two
/// writers are expected to race on the same key.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reads and parses the JSON document stored under `key`.
///
/// Returns `None` when the key is absent, unreadable, or does not parse as `T`.
/// Failures are logged and never propagated.
pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read '{}' from storage: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring corrupted value under '{}': {}", key, e);
            None
        }
    }
}

/// Serializes `value` and stores it under `key`, logging instead of failing.
///
/// Returns `true` when the value was persisted.
pub fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool
where
    T: serde::Serialize + ?Sized,
{
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));

    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not persist '{}', keeping in-memory state: {}", key, e);
            false
        }
    }
}

/// Errors that can occur while reading or writing the key-value store.
#[derive(Debug)]
pub enum StorageError {
    /// Error occurred during file I/O.
    Io(std::io::Error),

    /// Value could not be serialized or deserialized.
    Serialization(serde_json::Error),

    /// The store refused the operation (quota exceeded, disabled, etc.).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "Storage I/O error: {}", err),
            StorageError::Serialization(err) => write!(f, "Storage serialization error: {}", err),
            StorageError::Unavailable(reason) => write!(f, "Storage unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::Serialization(err) => Some(err),
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err)
    }
}
