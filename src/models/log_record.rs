use crate::models::error::ValidationError;
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Closed set of log categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Wire name, as it appears in payloads and the history slot
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// Upper-case label for display
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(ValidationError::UnknownLevel(s.to_string())),
        }
    }
}

/// A single log record. Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    timestamp: String,
    level: Severity,
    message: String,
}

impl LogRecord {
    /// Build a record from raw form or wire input
    pub fn create(timestamp: &str, level: &str, message: &str) -> Result<Self, ValidationError> {
        let level = level.parse::<Severity>()?;
        Self::new(timestamp.to_string(), level, message.to_string())
    }

    pub fn new(timestamp: String, level: Severity, message: String) -> Result<Self, ValidationError> {
        if message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(Self {
            timestamp,
            level,
            message,
        })
    }

    /// Record stamped with the current instant in ISO-8601 (millisecond, `Z`) form
    pub fn now(level: &str, message: &str) -> Result<Self, ValidationError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Self::create(&timestamp, level, message)
    }

    /// Re-check a record that arrived through deserialization
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(())
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Parsed creation instant, `None` if the timestamp is not RFC 3339
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// A record as stored in the history, with its presentation key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "key_from_string_or_number")]
    pub key: String,
    #[serde(flatten)]
    pub record: LogRecord,
}

impl HistoryEntry {
    pub fn new(key: String, record: LogRecord) -> Self {
        Self { key, record }
    }

    pub fn level(&self) -> Severity {
        self.record.level()
    }
}

// Older writers stored numeric keys
fn key_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawKey {
        Text(String),
        Number(u64),
    }

    Ok(match RawKey::deserialize(deserializer)? {
        RawKey::Text(text) => text,
        RawKey::Number(number) => number.to_string(),
    })
}

/// Numeric keys at or above this were not handed out by the key counter and are
/// not stepped past
const KEY_CEILING: u64 = u64::MAX / 2;

/// Ordered history, newest entry first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub(crate) fn prepend(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    /// Next key a monotonic counter may hand out without clashing with a stored key
    pub(crate) fn next_free_key(&self) -> u64 {
        let (counted, foreign): (Vec<u64>, Vec<u64>) = self
            .entries
            .iter()
            .filter_map(|entry| entry.key.parse::<u64>().ok())
            .partition(|key| *key < KEY_CEILING);

        if !foreign.is_empty() {
            warn!(
                "Ignoring {} out-of-range history key(s) when resuming the key counter",
                foreign.len()
            );
        }

        let past_numeric = counted.into_iter().max().map_or(0, |max| max + 1);
        past_numeric.max(self.entries.len() as u64)
    }
}

impl FromIterator<HistoryEntry> for History {
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accepts_known_levels() {
        for level in ["debug", "info", "warning", "error"] {
            let record = LogRecord::create("2024-01-01T09:00:00.000Z", level, "boot").unwrap();
            assert_eq!(record.level().as_str(), level);
            assert_eq!(record.message(), "boot");
        }
    }

    #[test]
    fn test_create_rejects_empty_message() {
        let result = LogRecord::create("2024-01-01T09:00:00.000Z", "info", "");
        assert_eq!(result, Err(ValidationError::EmptyMessage));

        let result = LogRecord::create("2024-01-01T09:00:00.000Z", "info", "   ");
        assert_eq!(result, Err(ValidationError::EmptyMessage));
    }

    #[test]
    fn test_create_rejects_unknown_level() {
        let result = LogRecord::create("2024-01-01T09:00:00.000Z", "fatal", "boom");
        assert_eq!(result, Err(ValidationError::UnknownLevel("fatal".to_string())));
    }

    #[test]
    fn test_severity_wire_form_is_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        assert!(serde_json::from_str::<Severity>("\"WARNING\"").is_err());
    }

    #[test]
    fn test_now_produces_parsable_instant() {
        let record = LogRecord::now("info", "hello").unwrap();
        assert!(record.instant().is_some());
        assert!(record.timestamp().ends_with('Z'));
    }

    #[test]
    fn test_history_entry_serializes_flat() {
        let record = LogRecord::create("2024-01-01T09:00:00.000Z", "info", "boot").unwrap();
        let entry = HistoryEntry::new("0".to_string(), record);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "key": "0",
                "timestamp": "2024-01-01T09:00:00.000Z",
                "level": "info",
                "message": "boot",
            })
        );
    }

    #[test]
    fn test_history_entry_accepts_numeric_key() {
        let json = r#"{"key": 7, "timestamp": "2024-01-01T09:00:00.000Z", "level": "error", "message": "x"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.key, "7");
        assert_eq!(entry.level(), Severity::Error);
    }

    #[test]
    fn test_next_free_key_skips_past_stored_keys() {
        let record = LogRecord::create("2024-01-01T09:00:00.000Z", "info", "x").unwrap();
        let history: History = vec![
            HistoryEntry::new("5".to_string(), record.clone()),
            HistoryEntry::new("abc".to_string(), record),
        ]
        .into_iter()
        .collect();

        assert_eq!(history.next_free_key(), 6);
        assert_eq!(History::new().next_free_key(), 0);
    }

    #[test]
    fn test_next_free_key_ignores_out_of_range_keys() {
        let record = LogRecord::create("2024-01-01T09:00:00.000Z", "info", "x").unwrap();
        let history: History = vec![
            HistoryEntry::new(u64::MAX.to_string(), record.clone()),
            HistoryEntry::new((u64::MAX - 1).to_string(), record.clone()),
            HistoryEntry::new("3".to_string(), record),
        ]
        .into_iter()
        .collect();

        assert_eq!(history.next_free_key(), 4);
    }
}
