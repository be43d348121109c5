//! Statistics and search helpers over the history list.
//!
//! Feeds the dashboard view: cumulative time saved, per-search bars for the
//! most recent entries, and recurring research topics.

use super::models::{normalize_query, HistoryEntry};
use crate::estimate::{ai_minutes, MANUAL_MINUTES_PER_PAPER};
use once_cell::sync::Lazy;
use regex::Regex;

/// Words ignored when extracting trending terms.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "of", "in", "for", "to", "a", "on", "with", "latest", "review", "guidelines",
];

/// Number of recent entries shown as bars.
pub const RECENT_BARS: usize = 10;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// Aggregate numbers over the whole history.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub searches: usize,
    pub total_papers: u32,
    pub manual_minutes: u32,
    pub ai_minutes: u32,
    pub minutes_saved: u32,
    /// Rounded average of `minutes_saved` per search.
    pub average_saved_per_search: u32,
    /// Manual minutes of the most recent entries, as percentages of the largest.
    pub recent_bars: Vec<u32>,
}

/// Computes dashboard statistics for `entries` (newest first).
pub fn compute_stats(entries: &[HistoryEntry]) -> HistoryStats {
    let searches = entries.len();
    // Stored counts are not trusted; saturate instead of overflowing
    let total_papers = entries
        .iter()
        .fold(0u32, |acc, e| acc.saturating_add(e.num_papers));
    let manual_minutes = total_papers.saturating_mul(MANUAL_MINUTES_PER_PAPER);
    let ai_total = entries
        .iter()
        .fold(0u32, |acc, e| acc.saturating_add(ai_minutes(e.processing_time_seconds)));
    let minutes_saved = manual_minutes.saturating_sub(ai_total);
    let average_saved_per_search = if searches == 0 {
        0
    } else {
        (minutes_saved as f64 / searches as f64).round() as u32
    };

    let recent: Vec<u32> = entries
        .iter()
        .take(RECENT_BARS)
        .map(|e| e.num_papers.saturating_mul(MANUAL_MINUTES_PER_PAPER))
        .collect();

    HistoryStats {
        searches,
        total_papers,
        manual_minutes,
        ai_minutes: ai_total,
        minutes_saved,
        average_saved_per_search,
        recent_bars: to_bars(&recent),
    }
}

/// Scales values to percentages of the largest one (at least 1).
fn to_bars(values: &[u32]) -> Vec<u32> {
    let max = values.iter().copied().max().unwrap_or(0).max(1);
    values
        .iter()
        .map(|&v| ((v as f64 / max as f64) * 100.0).round() as u32)
        .collect()
}

/// Returns the most frequent topic words across all queries.
///
/// Words are lowercased; stop words and words shorter than three characters
/// are ignored. Ties keep first-seen order.
pub fn trending_terms(entries: &[HistoryEntry], limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for entry in entries {
        for word in NON_WORD.split(&entry.query) {
            let word = word.to_lowercase();
            if word.len() < 3 || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            match counts.iter_mut().find(|(w, _)| *w == word) {
                Some((_, count)) => *count += 1,
                None => counts.push((word, 1)),
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(w, _)| w).collect()
}

/// Suggests follow-up searches for the top three trending terms.
pub fn recommendations(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .take(3)
        .flat_map(|term| {
            [
                format!("latest {} guidelines", term),
                format!("systematic review {}", term),
                format!("RCT {} outcomes", term),
            ]
        })
        .take(6)
        .collect()
}

/// Filters entries whose query contains `filter` (normalized), preserving order.
pub fn search_history(filter: &str, entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let needle = normalize_query(filter);
    if needle.is_empty() {
        return entries.to_vec();
    }

    entries
        .iter()
        .filter(|entry| normalize_query(&entry.query).contains(&needle))
        .cloned()
        .collect()
}
