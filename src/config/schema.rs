//! Configuration schema for MedLit.
//!
//! This module defines the application configuration structure and its
//! validation logic. User preferences (model, summary length, etc.) are not
//! part of this; they live in the settings store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Largest paper count the summarization backend accepts per request.
pub const MAX_NUM_PAPERS: u32 = 10;

/// Application configuration.
///
/// Loaded from the `"medlit"` key of a JSON settings document. Missing or
/// invalid settings fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedlitConfig {
    /// Base URL of the summarization backend.
    ///
    /// Defaults to `http://localhost:8000`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path of the search-and-summarize endpoint, joined onto `api_base_url`.
    #[serde(default = "default_summarize_path")]
    pub summarize_path: String,

    /// Request timeout in milliseconds, per attempt.
    ///
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Total number of attempts for one summarization request.
    ///
    /// Must be at least 1. Defaults to 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step in milliseconds.
    ///
    /// After failed attempt `n` the client waits `n * backoffStepMs` before
    /// trying again. Defaults to 300.
    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    /// Number of papers requested per search. Must be within 1..=10.
    #[serde(default = "default_num_papers")]
    pub default_num_papers: u32,

    /// Directory holding history, settings and audit files.
    ///
    /// `None` means the platform default (`~/.config/medlit`).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Retry client errors (4xx) as well as network and server failures.
    ///
    /// Off by default: a malformed request will not succeed on retry.
    #[serde(default)]
    pub retry_client_errors: bool,
}

impl Default for MedlitConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            summarize_path: default_summarize_path(),
            timeout: default_timeout(),
            max_attempts: default_max_attempts(),
            backoff_step_ms: default_backoff_step_ms(),
            default_num_papers: default_num_papers(),
            data_dir: None,
            retry_client_errors: false,
        }
    }
}

impl MedlitConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.max_attempts == 0 {
            return Err("maxAttempts must be at least 1".to_string());
        }

        if self.default_num_papers == 0 || self.default_num_papers > MAX_NUM_PAPERS {
            return Err(format!(
                "defaultNumPapers must be between 1 and {}",
                MAX_NUM_PAPERS
            ));
        }

        if let Err(e) = url::Url::parse(&self.api_base_url) {
            return Err(format!("apiBaseUrl is not a valid URL: {}", e));
        }

        Ok(())
    }

    /// Returns the per-attempt timeout as a `Duration`.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Returns the linear backoff step as a `Duration`.
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }

    /// Full URL of the summarization endpoint.
    pub fn summarize_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            self.summarize_path.trim_start_matches('/')
        )
    }
}

// Default value functions for serde

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_summarize_path() -> String {
    "/api/summarize/search".to_string()
}

fn default_timeout() -> u64 {
    30000 // 30 seconds in milliseconds
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_step_ms() -> u64 {
    300
}

fn default_num_papers() -> u32 {
    5
}
