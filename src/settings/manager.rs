//! Persistent settings manager.

use super::models::{
    clamp_temperature, dedup_keywords, DataResidency, ModelChoice, Schedule, SettingsRecord,
    SummaryLength, MAX_TRACKED_KEYWORDS,
};
use crate::storage::{self, KeyValueStore, SETTINGS_KEY};
use serde_json::Value;
use std::sync::Arc;

/// Owns the single settings record and persists it after every change.
///
/// Loaded once at startup; storage failures are logged and the in-memory
/// record stays authoritative.
pub struct SettingsManager {
    store: Arc<dyn KeyValueStore>,
    state: SettingsRecord,
}

impl SettingsManager {
    /// Loads settings from `store`, merging stored fields over defaults.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let state = match storage::read_json::<Value>(store.as_ref(), SETTINGS_KEY) {
            Some(value) => SettingsRecord::from_stored(&value),
            None => SettingsRecord::default(),
        };
        Self { store, state }
    }

    pub fn get(&self) -> &SettingsRecord {
        &self.state
    }

    pub fn set_model(&mut self, model: ModelChoice) {
        self.update(|s| s.model = model);
    }

    /// Sets the temperature, clamped into `[0, 1]`.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.update(|s| s.temperature = clamp_temperature(temperature));
    }

    pub fn set_length(&mut self, length: SummaryLength) {
        self.update(|s| s.length = length);
    }

    /// Sets or clears the active research profile. Blank names clear it.
    pub fn set_profile(&mut self, profile: Option<String>) {
        let profile = profile
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self.update(|s| s.profile = profile);
    }

    pub fn set_hipaa_mode(&mut self, enabled: bool) {
        self.update(|s| s.hipaa_mode = enabled);
    }

    pub fn set_residency(&mut self, residency: DataResidency) {
        self.update(|s| s.data_residency = residency);
    }

    pub fn set_anonymize_phi(&mut self, enabled: bool) {
        self.update(|s| s.anonymize_phi = enabled);
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.update(|s| s.schedule = schedule);
    }

    /// Adds a tracked keyword.
    ///
    /// Duplicates and blank keywords are ignored, and the list never grows
    /// past 20 entries. Returns `true` if the keyword was added.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return false;
        }

        let mut keywords = self.state.tracked_keywords.clone();
        keywords.push(keyword.to_string());
        let keywords = dedup_keywords(keywords);
        let added = keywords.len() > self.state.tracked_keywords.len();

        if self.state.tracked_keywords.len() >= MAX_TRACKED_KEYWORDS {
            log::debug!("Keyword list full, dropping '{}'", keyword);
        }

        self.update(|s| s.tracked_keywords = keywords);
        added
    }

    /// Removes a tracked keyword. Returns `true` if it was present.
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        let present = self.state.tracked_keywords.iter().any(|k| k.as_str() == keyword);
        self.update(|s| s.tracked_keywords.retain(|k| k.as_str() != keyword));
        present
    }

    /// Restores every field to its default.
    pub fn reset(&mut self) {
        self.update(|s| *s = SettingsRecord::default());
    }

    fn update<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut SettingsRecord),
    {
        updater(&mut self.state);
        storage::write_json(self.store.as_ref(), SETTINGS_KEY, &self.state);
    }
}
