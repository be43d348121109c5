//! Persistent search history.
//!
//! `SearchHistory` keeps the list in memory and writes the whole list back to
//! the key-value store after every mutation. Storage failures never reach the
//! caller: the in-memory list stays correct for the rest of the session.

use super::models::{normalize_query, HistoryEntry, RestoredSearch, DEDUP_WINDOW, MAX_HISTORY_ENTRIES};
use crate::storage::{self, KeyValueStore, HISTORY_KEY};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Ordered, de-duplicated, size-capped log of past searches.
///
/// Entries are kept newest-first. A query that normalizes to the same text as
/// one of the [`DEDUP_WINDOW`] most recent entries refreshes that entry
/// instead of adding a duplicate. Older duplicates beyond the window are
/// tolerated.
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<HistoryEntry>,
}

impl SearchHistory {
    /// Loads the history from `store`.
    ///
    /// Missing or corrupted data yields an empty history. Individual entries
    /// that fail to parse are skipped.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = load_entries(store.as_ref());
        Self { store, entries }
    }

    /// All entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Records a completed search at the current time.
    ///
    /// Returns the entry that now sits at the front of the history.
    pub fn add(
        &mut self,
        query: &str,
        num_papers: u32,
        processing_time_seconds: Option<f64>,
    ) -> &HistoryEntry {
        self.add_at(query, num_papers, processing_time_seconds, Utc::now())
    }

    /// Records a completed search at `at`.
    ///
    /// Timestamps never go backwards: if `at` is older than the newest entry,
    /// the newest entry's timestamp is used so the list stays sorted.
    pub fn add_at(
        &mut self,
        query: &str,
        num_papers: u32,
        processing_time_seconds: Option<f64>,
        at: DateTime<Utc>,
    ) -> &HistoryEntry {
        let normalized = normalize_query(query);
        let timestamp = match self.entries.first() {
            Some(newest) if newest.timestamp > at => newest.timestamp,
            _ => at,
        };

        let window = self.entries.len().min(DEDUP_WINDOW);
        let existing = self.entries[..window]
            .iter()
            .position(|e| e.matches(&normalized));

        let entry = match existing {
            Some(index) => {
                let mut entry = self.entries.remove(index);
                entry.num_papers = num_papers;
                entry.timestamp = timestamp;
                entry.processing_time_seconds = processing_time_seconds;
                log::debug!("Refreshed history entry {} for '{}'", entry.id, normalized);
                entry
            }
            None => HistoryEntry::new(&normalized, num_papers, processing_time_seconds, timestamp),
        };

        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        self.persist();

        &self.entries[0]
    }

    /// Deletes the entry with `id`.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        self.persist();
        removed
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    /// Returns the inputs needed to re-run `entry`. Has no side effects.
    pub fn restore(entry: &HistoryEntry) -> RestoredSearch {
        entry.restore()
    }

    fn persist(&self) {
        storage::write_json(self.store.as_ref(), HISTORY_KEY, &self.entries);
    }
}

fn load_entries(store: &dyn KeyValueStore) -> Vec<HistoryEntry> {
    let values: Vec<Value> = match storage::read_json(store, HISTORY_KEY) {
        Some(values) => values,
        None => return Vec::new(),
    };

    let mut corrupted = 0;
    let mut entries: Vec<HistoryEntry> = values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<HistoryEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                corrupted += 1;
                log::warn!("Skipping corrupted history entry: {}", e);
                None
            }
        })
        .collect();

    if corrupted > 0 {
        log::warn!(
            "History has {} corrupted entries, {} valid entries kept",
            corrupted,
            entries.len()
        );
    }

    // Stable sort keeps stored order for equal timestamps
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(MAX_HISTORY_ENTRIES);
    entries
}
