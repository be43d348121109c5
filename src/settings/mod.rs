//! User settings.
//!
//! A single mutable record (model, temperature, summary length, research
//! profile, privacy flags, schedule, tracked keywords) persisted after every
//! change and loaded once at startup.

pub mod manager;
pub mod models;

pub use manager::SettingsManager;
pub use models::{
    DataResidency, ModelChoice, Schedule, SettingsRecord, SummaryLength, MAX_TRACKED_KEYWORDS,
};
