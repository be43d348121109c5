//! Data models for search history.
//!
//! This module defines the history entry record and the query normalization
//! used to detect repeated searches.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of history entries retained.
pub const MAX_HISTORY_ENTRIES: usize = 100;

/// Number of most recent entries checked for a repeated query.
///
/// A repeated query older than this window is appended as a new entry.
pub const DEDUP_WINDOW: usize = 10;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes a search query for de-duplication.
///
/// Lowercases, collapses runs of whitespace to one space, and trims.
///
/// # Example
///
/// ```
/// use medlit::history::normalize_query;
///
/// assert_eq!(normalize_query("  Diabetes \t Treatment "), "diabetes treatment");
/// ```
pub fn normalize_query(query: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&query.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// A single past search.
///
/// Serialized in camelCase to match the stored history format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique identifier for this entry (UUID v4).
    pub id: String,

    /// Normalized query text.
    pub query: String,

    /// Number of papers requested for this search.
    pub num_papers: u32,

    /// When the search last ran, in UTC.
    pub timestamp: DateTime<Utc>,

    /// Backend processing time reported for the search, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<f64>,
}

impl HistoryEntry {
    /// Creates a new entry with a fresh id.
    pub fn new(
        query: &str,
        num_papers: u32,
        processing_time_seconds: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: normalize_query(query),
            num_papers,
            timestamp,
            processing_time_seconds,
        }
    }

    /// Returns whether `normalized` matches this entry's query.
    pub fn matches(&self, normalized: &str) -> bool {
        normalize_query(&self.query) == normalized
    }

    /// Projects the fields needed to run this search again.
    pub fn restore(&self) -> RestoredSearch {
        RestoredSearch {
            query: self.query.clone(),
            num_papers: self.num_papers,
        }
    }
}

/// The inputs of a past search, ready to be submitted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoredSearch {
    pub query: String,
    pub num_papers: u32,
}
