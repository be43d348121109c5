//! Search history tracking and persistence.
//!
//! This module keeps a newest-first log of past searches so users can review
//! and re-run them.
//!
//! # Features
//!
//! - De-duplication of repeated queries within the 10 most recent entries
//! - Automatic cap of 100 entries
//! - Silent recovery from missing or corrupted storage
//! - Dashboard statistics and trending topics
//!
//! # Example
//!
//! ```
//! use medlit::history::SearchHistory;
//! use medlit::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! let mut history = SearchHistory::load(Arc::new(MemoryStore::new()));
//! history.add("diabetes treatment", 5, Some(12.0));
//! history.add("Diabetes  Treatment", 5, Some(9.5));
//! assert_eq!(history.len(), 1);
//! ```

pub mod insights;
pub mod models;
pub mod storage;
pub mod ui;

// Re-export commonly used types
pub use insights::{compute_stats, recommendations, search_history, trending_terms, HistoryStats};
pub use models::{normalize_query, HistoryEntry, RestoredSearch, DEDUP_WINDOW, MAX_HISTORY_ENTRIES};
pub use storage::SearchHistory;
pub use ui::{
    format_history_entry, format_history_entry_relative, format_history_list, group_by_day,
    group_by_local_day, DayGroup,
};
