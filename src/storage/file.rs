//! File-backed key-value store.
//!
//! Each key is stored as its own JSON file inside a data directory. Writes go
//! to a temporary sibling first and are renamed over the target, so a crash
//! mid-write leaves the previous value intact.

use super::{KeyValueStore, StorageError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Key-value store persisting one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    /// Opens the store in the default data directory.
    ///
    /// Uses `~/.config/medlit` on Unix-like systems, or the roaming AppData
    /// equivalent on Windows.
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(default_data_dir()?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are namespaced with dots; anything outside [A-Za-z0-9._-] is
        // replaced so a key can never escape the data directory.
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

/// Resolves the default data directory from the environment.
///
/// # Errors
///
/// Returns `StorageError::Io` when no home directory can be determined.
pub fn default_data_dir() -> Result<PathBuf, StorageError> {
    let config_dir = if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config")
    } else if let Some(user_profile) = std::env::var_os("USERPROFILE") {
        PathBuf::from(user_profile).join("AppData").join("Roaming")
    } else {
        return Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        )));
    };

    Ok(config_dir.join("medlit"))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;
        drop(temp_file);

        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
