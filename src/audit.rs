//! Append-only log of user actions.
//!
//! Events are kept newest-first and capped at [`MAX_AUDIT_EVENTS`]; the
//! oldest events fall off the end.

use crate::storage::{self, KeyValueStore, AUDIT_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Maximum number of audit events retained.
pub const MAX_AUDIT_EVENTS: usize = 200;

/// Kind of user action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditEventType {
    Search,
    Summarize,
    Export,
    Copy,
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditEventType::Search => "search",
            AuditEventType::Summarize => "summarize",
            AuditEventType::Export => "export",
            AuditEventType::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// A recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "type")]
    pub event_type: AuditEventType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Map<String, Value>>,
}

/// Capped, persistent audit log.
pub struct AuditLog {
    store: Arc<dyn KeyValueStore>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Records an event at the current time.
    ///
    /// Stored entries this version cannot decode are carried over untouched.
    pub fn log_event(&self, event_type: AuditEventType, payload: Option<Map<String, Value>>) {
        let event = AuditEvent {
            timestamp: Utc::now(),
            event_type,
            payload,
        };
        let value = match serde_json::to_value(&event) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not encode audit event {}: {}", event_type, e);
                return;
            }
        };

        let mut values = self.stored_values();
        values.insert(0, value);
        values.truncate(MAX_AUDIT_EVENTS);

        log::debug!("Audit event: {}", event_type);
        storage::write_json(self.store.as_ref(), AUDIT_KEY, &values);
    }

    /// All readable events, newest first.
    ///
    /// Read from storage on every call. A corrupt or missing log reads as
    /// empty; individual events that fail to decode are skipped.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.stored_values()
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<AuditEvent>(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    log::warn!("Skipping unreadable audit event: {}", e);
                    None
                }
            })
            .collect()
    }

    fn stored_values(&self) -> Vec<Value> {
        storage::read_json::<Vec<Value>>(self.store.as_ref(), AUDIT_KEY).unwrap_or_default()
    }

    /// The `limit` most recent events.
    pub fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let mut events = self.events();
        events.truncate(limit);
        events
    }

    /// Deletes every event.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(AUDIT_KEY) {
            log::warn!("Failed to clear audit log: {}", e);
        }
    }
}

/// Builds an audit payload from key/value pairs.
pub fn payload<I, K>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
