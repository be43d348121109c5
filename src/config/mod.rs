//! Configuration management for MedLit.
//!
//! This module provides configuration loading, validation, and access through a singleton pattern.
//! Configuration is read from the `"medlit"` key of a JSON document and merged with defaults.

pub mod schema;

pub use schema::{MedlitConfig, MAX_NUM_PAPERS};

use once_cell::sync::Lazy;
use serde_json::Value;
use std::path::Path;
use std::sync::RwLock;

/// Global configuration instance.
///
/// This is lazily initialized on first access and can be updated when settings change.
static CONFIG: Lazy<RwLock<MedlitConfig>> = Lazy::new(|| RwLock::new(MedlitConfig::default()));

/// Loads configuration from a JSON value.
///
/// Reads the `"medlit"` object, merges it with defaults, validates the result,
/// and updates the global configuration.
///
/// # Arguments
///
/// * `settings_json` - Optional JSON value containing settings under the `"medlit"` key
///
/// # Returns
///
/// `Ok(MedlitConfig)` with the loaded configuration, or `Err` if validation fails.
///
/// # Example
///
/// ```no_run
/// use medlit::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "medlit": {
///         "apiBaseUrl": "https://medlit.example.org",
///         "maxAttempts": 5
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.max_attempts, 5);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<MedlitConfig, String> {
    let mut config = MedlitConfig::default();

    if let Some(settings) = settings_json {
        if let Some(medlit_settings) = settings.get("medlit") {
            match serde_json::from_value::<MedlitConfig>(medlit_settings.clone()) {
                Ok(user_config) => {
                    // Absent fields were already filled with defaults by serde
                    config = user_config;
                }
                Err(e) => {
                    log::warn!("Failed to parse medlit settings: {}. Using defaults.", e);
                }
            }
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Loads configuration from a JSON file.
///
/// A missing file is not an error: defaults are loaded instead. A file that
/// is not valid JSON is reported as an error.
pub fn load_config_file(path: &Path) -> Result<MedlitConfig, String> {
    if !path.exists() {
        log::debug!("No config file at {}, using defaults", path.display());
        return load_config(None);
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| format!("Could not parse {}: {}", path.display(), e))?;

    load_config(Some(value))
}

/// Gets the current global configuration.
///
/// If configuration has not been loaded yet, returns the default configuration.
pub fn get_config() -> MedlitConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| MedlitConfig::default())
}

/// Updates the global configuration in place.
///
/// If the update leaves the configuration invalid, it is reverted to defaults.
///
/// # Example
///
/// ```no_run
/// use medlit::config::update_config;
///
/// update_config(|config| {
///     config.backoff_step_ms = 100;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut MedlitConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            log::warn!("Configuration validation failed after update: {}", e);
            *config = MedlitConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = MedlitConfig::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, MedlitConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_config_partial_settings() {
        let settings = json!({
            "medlit": {
                "backoffStepMs": 50
            }
        });

        let config = load_config(Some(settings)).unwrap();
        assert_eq!(config.backoff_step_ms, 50);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.timeout, 30000);
        reset_config();
    }

    #[test]
    #[serial]
    fn test_load_config_invalid_json_falls_back() {
        let settings = json!({
            "medlit": {
                "timeout": "not-a-number"
            }
        });

        let config = load_config(Some(settings)).unwrap();
        assert_eq!(config.timeout, 30000);
    }

    #[test]
    #[serial]
    fn test_load_config_validation_error() {
        let settings = json!({
            "medlit": {
                "maxAttempts": 0
            }
        });

        let result = load_config(Some(settings));
        assert!(result.unwrap_err().contains("maxAttempts"));
    }

    #[test]
    #[serial]
    fn test_get_and_update_config() {
        reset_config();
        assert_eq!(get_config().max_attempts, 3);

        update_config(|config| {
            config.max_attempts = 4;
        });
        assert_eq!(get_config().max_attempts, 4);

        // Invalid update reverts to defaults
        update_config(|config| {
            config.timeout = 0;
        });
        assert_eq!(get_config(), MedlitConfig::default());

        reset_config();
    }

    #[test]
    #[serial]
    fn test_no_medlit_key() {
        let settings = json!({
            "other-tool": { "timeout": 1 }
        });

        let config = load_config(Some(settings)).unwrap();
        assert_eq!(config.timeout, 30000);
    }

    #[test]
    #[serial]
    fn test_load_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("medlit.json");
        std::fs::write(
            &path,
            r#"{"medlit": {"apiBaseUrl": "http://10.0.0.2:9000", "defaultNumPapers": 8}}"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.2:9000");
        assert_eq!(config.default_num_papers, 8);
        assert_eq!(get_config().default_num_papers, 8);

        reset_config();
    }

    #[test]
    #[serial]
    fn test_load_config_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_file(&temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(config, MedlitConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_config_file_not_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("medlit.json");
        std::fs::write(&path, "{{{").unwrap();

        assert!(load_config_file(&path).unwrap_err().contains("Could not parse"));
    }
}
