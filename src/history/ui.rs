//! UI formatting utilities for history display.
//!
//! This module groups entries by calendar day and formats them into
//! human-readable strings for list views.

use super::models::HistoryEntry;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// Calendar bucket used to group history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayGroup {
    Today,
    Yesterday,
    ThisWeek,
    Older,
}

impl DayGroup {
    pub fn label(&self) -> &'static str {
        match self {
            DayGroup::Today => "Today",
            DayGroup::Yesterday => "Yesterday",
            DayGroup::ThisWeek => "This week",
            DayGroup::Older => "Older",
        }
    }

    /// Classifies `date` relative to `today` by whole calendar days.
    pub fn classify(date: NaiveDate, today: NaiveDate) -> Self {
        match (today - date).num_days() {
            d if d <= 0 => DayGroup::Today,
            1 => DayGroup::Yesterday,
            d if d < 7 => DayGroup::ThisWeek,
            _ => DayGroup::Older,
        }
    }
}

/// Groups entries by day relative to `now`, in the time zone `tz`.
///
/// Groups appear in the order of their first entry; entries keep their
/// order within a group. Since history is newest-first, this yields
/// Today, Yesterday, This week, Older.
pub fn group_by_day<'a, Tz: TimeZone>(
    entries: &'a [HistoryEntry],
    now: &DateTime<Tz>,
) -> Vec<(DayGroup, Vec<&'a HistoryEntry>)> {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut groups: Vec<(DayGroup, Vec<&HistoryEntry>)> = Vec::new();

    for entry in entries {
        let date = entry.timestamp.with_timezone(&tz).date_naive();
        let group = DayGroup::classify(date, today);
        match groups.iter_mut().find(|(g, _)| *g == group) {
            Some((_, list)) => list.push(entry),
            None => groups.push((group, vec![entry])),
        }
    }

    groups
}

/// Groups entries by day in the local time zone.
pub fn group_by_local_day(entries: &[HistoryEntry]) -> Vec<(DayGroup, Vec<&HistoryEntry>)> {
    group_by_day(entries, &Local::now())
}

/// Formats a list of history entries for display.
pub fn format_history_list(entries: &[HistoryEntry]) -> Vec<String> {
    entries.iter().map(format_history_entry).collect()
}

/// Formats a single history entry for list display.
///
/// Format: `query · N papers · 12.3s (timestamp) [id]`
pub fn format_history_entry(entry: &HistoryEntry) -> String {
    let mut line = format!(
        "{} · {} {}",
        entry.query,
        entry.num_papers,
        if entry.num_papers == 1 { "paper" } else { "papers" }
    );

    if let Some(seconds) = entry.processing_time_seconds {
        line.push_str(&format!(" · {:.1}s", seconds));
    }

    line.push_str(&format!(
        " ({}) [{}]",
        format_timestamp(&entry.timestamp),
        entry.id
    ));
    line
}

/// Formats a history entry with relative time (e.g. "5 minutes ago").
pub fn format_history_entry_relative(entry: &HistoryEntry, now: DateTime<Utc>) -> String {
    format!(
        "{} · {} papers ({})",
        entry.query,
        entry.num_papers,
        format_relative_time(&entry.timestamp, now)
    )
}

/// Formats a timestamp in the local time zone.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.with_timezone(&Local);
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// Formats the age of `timestamp` relative to `now`.
pub fn format_relative_time(timestamp: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - *timestamp).num_seconds().max(0);

    let (amount, unit) = match seconds {
        s if s < 60 => return "just now".to_string(),
        s if s < 3600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3600, "hour"),
        s => (s / 86_400, "day"),
    };

    format!("{} {}{} ago", amount, unit, if amount == 1 { "" } else { "s" })
}
