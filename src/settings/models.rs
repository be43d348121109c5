//! Settings record and its option types.
//!
//! The record is stored as one camelCase JSON object. Every field has a
//! default so that data written by an older version, which lacks newer
//! fields, still loads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Maximum number of tracked keywords.
pub const MAX_TRACKED_KEYWORDS: usize = 20;

/// Summarization model requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelChoice {
    #[serde(rename = "llama3.1")]
    Llama31,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "claude")]
    Claude,
    #[serde(rename = "biogpt")]
    BioGpt,
}

/// Target length of generated summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Brief,
    Standard,
    Comprehensive,
}

/// Where processed data may live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataResidency {
    Local,
    Cloud,
    Encrypted,
}

/// How often tracked keywords are re-searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Off,
    Daily,
    Weekly,
}

macro_rules! string_enum {
    ($ty:ty { $($variant:path => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(format!(
                        "unknown value '{}', expected one of: {}",
                        other,
                        [$($name),+].join(", ")
                    )),
                }
            }
        }
    };
}

string_enum!(ModelChoice {
    ModelChoice::Llama31 => "llama3.1",
    ModelChoice::Gpt4 => "gpt-4",
    ModelChoice::Claude => "claude",
    ModelChoice::BioGpt => "biogpt",
});

string_enum!(SummaryLength {
    SummaryLength::Brief => "brief",
    SummaryLength::Standard => "standard",
    SummaryLength::Comprehensive => "comprehensive",
});

string_enum!(DataResidency {
    DataResidency::Local => "local",
    DataResidency::Cloud => "cloud",
    DataResidency::Encrypted => "encrypted",
});

string_enum!(Schedule {
    Schedule::Off => "off",
    Schedule::Daily => "daily",
    Schedule::Weekly => "weekly",
});

/// User settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    /// Summarization model. Defaults to `llama3.1`.
    #[serde(default = "default_model")]
    pub model: ModelChoice,

    /// Sampling temperature within `[0, 1]`. Defaults to 0.
    #[serde(default)]
    pub temperature: f64,

    /// Summary length. Defaults to `standard`.
    #[serde(default = "default_length")]
    pub length: SummaryLength,

    /// Name of the active research profile, if any.
    #[serde(default)]
    pub profile: Option<String>,

    /// HIPAA mode. Defaults to on.
    #[serde(default = "default_true")]
    pub hipaa_mode: bool,

    /// Data residency. Defaults to `local`.
    #[serde(default = "default_residency")]
    pub data_residency: DataResidency,

    /// Anonymize PHI before sending text to the backend. Defaults to on.
    #[serde(default = "default_true", rename = "anonymizePHI")]
    pub anonymize_phi: bool,

    /// Keyword re-search schedule. Defaults to `off`.
    #[serde(default = "default_schedule")]
    pub schedule: Schedule,

    /// Up to 20 unique keywords to track.
    #[serde(default)]
    pub tracked_keywords: Vec<String>,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            length: default_length(),
            profile: None,
            hipaa_mode: true,
            data_residency: default_residency(),
            anonymize_phi: true,
            schedule: default_schedule(),
            tracked_keywords: Vec::new(),
        }
    }
}

impl SettingsRecord {
    /// Builds a record from stored JSON, field by field.
    ///
    /// Absent fields take their defaults. A field whose stored value has the
    /// wrong type or an unknown variant also falls back to its default,
    /// without discarding the other fields. Anything other than a JSON
    /// object yields the defaults.
    pub fn from_stored(value: &Value) -> Self {
        let stored = match value.as_object() {
            Some(stored) => stored,
            None => return Self::default(),
        };

        let mut merged: Map<String, Value> = match serde_json::to_value(Self::default()) {
            Ok(Value::Object(map)) => map,
            _ => return Self::default(),
        };
        let known: Vec<String> = merged.keys().cloned().collect();

        for key in known {
            let Some(candidate) = stored.get(&key) else {
                continue;
            };
            let previous = merged.insert(key.clone(), candidate.clone());
            if serde_json::from_value::<Self>(Value::Object(merged.clone())).is_err() {
                log::warn!("Ignoring invalid stored setting '{}', using default", key);
                if let Some(previous) = previous {
                    merged.insert(key, previous);
                }
            }
        }

        serde_json::from_value::<Self>(Value::Object(merged))
            .map(Self::sanitized)
            .unwrap_or_default()
    }

    /// Clamps and de-duplicates fields that the type system cannot constrain.
    pub fn sanitized(mut self) -> Self {
        self.temperature = clamp_temperature(self.temperature);
        self.tracked_keywords = dedup_keywords(std::mem::take(&mut self.tracked_keywords));
        self
    }

    /// Options forwarded to the summarization backend with every search.
    pub fn request_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        options.insert("model".to_string(), Value::from(self.model.as_str()));
        options.insert("temperature".to_string(), Value::from(self.temperature));
        options.insert("length".to_string(), Value::from(self.length.as_str()));
        options.insert("hipaaMode".to_string(), Value::from(self.hipaa_mode));
        options.insert("anonymizePHI".to_string(), Value::from(self.anonymize_phi));
        options
    }
}

/// Clamps a temperature into `[0, 1]`; non-finite values become 0.
pub fn clamp_temperature(temperature: f64) -> f64 {
    if temperature.is_finite() {
        temperature.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Trims keywords, drops empties and duplicates, and caps the list.
pub fn dedup_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(keywords.len().min(MAX_TRACKED_KEYWORDS));
    for keyword in keywords {
        let keyword = keyword.trim().to_string();
        if !keyword.is_empty() && !unique.contains(&keyword) {
            unique.push(keyword);
        }
    }
    unique.truncate(MAX_TRACKED_KEYWORDS);
    unique
}

fn default_model() -> ModelChoice {
    ModelChoice::Llama31
}

fn default_length() -> SummaryLength {
    SummaryLength::Standard
}

fn default_residency() -> DataResidency {
    DataResidency::Local
}

fn default_schedule() -> Schedule {
    Schedule::Off
}

fn default_true() -> bool {
    true
}
