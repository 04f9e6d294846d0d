//! The captured-event model handed to the reporting client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier assigned to a captured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a fresh event id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.simple().fmt(f)
    }
}

/// Severity attached to events and breadcrumbs.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Diagnostic detail.
    Debug,
    /// Informational record.
    #[default]
    Info,
    /// Something surprising but survivable.
    Warning,
    /// A failure worth reporting.
    Error,
}

/// One captured error report.
///
/// A snapshot of the error together with the reporting context that was
/// active at capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Identifier assigned at capture time.
    pub id: EventId,
    /// When the event was captured.
    pub timestamp: DateTime<Utc>,
    /// Severity of the event.
    pub level: Level,
    /// Display message of the captured error.
    pub message: String,
    /// Display messages of the error's `source()` chain, outermost cause
    /// first.
    pub error_chain: Vec<String>,
    /// Tags from the scope active at capture time.
    pub tags: BTreeMap<String, String>,
    /// Breadcrumbs recorded on the active scope, oldest first.
    pub breadcrumbs: Vec<Breadcrumb>,
    /// Deployment environment from configuration, if set.
    pub environment: Option<String>,
    /// Release identifier from configuration, if set.
    pub release: Option<String>,
}

/// A lightweight, timestamped diagnostic record.
///
/// Breadcrumbs are not spans; they accumulate on the active scope and ride
/// along with whatever event is captured next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Severity of the breadcrumb.
    pub level: Level,
    /// Grouping category, such as a runtime or subsystem name.
    pub category: Option<String>,
    /// Free-form message, if any.
    pub message: Option<String>,
    /// Structured payload.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, serde_json::Value>,
    /// When the breadcrumb was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Breadcrumb {
    /// Creates an informational breadcrumb with the given category.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            category: Some(category.into()),
            message: None,
            data: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds one entry to the structured payload.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serialization() {
        assert_eq!(serde_json::to_string(&Level::Debug).unwrap(), "\"debug\"");
        assert_eq!(serde_json::to_string(&Level::Info).unwrap(), "\"info\"");
        assert_eq!(
            serde_json::to_string(&Level::Warning).unwrap(),
            "\"warning\""
        );
        assert_eq!(serde_json::to_string(&Level::Error).unwrap(), "\"error\"");
    }

    #[test]
    fn test_breadcrumb_builder() {
        let breadcrumb = Breadcrumb::new("rust")
            .with_level(Level::Info)
            .with_data("memory_current_bytes", 1024u64)
            .with_data("memory_peak_bytes", 4096u64);

        assert_eq!(breadcrumb.category.as_deref(), Some("rust"));
        assert!(breadcrumb.message.is_none());
        assert_eq!(
            breadcrumb.data.get("memory_current_bytes"),
            Some(&serde_json::json!(1024))
        );
        assert_eq!(
            breadcrumb.data.get("memory_peak_bytes"),
            Some(&serde_json::json!(4096))
        );
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = Event {
            id: EventId::new(),
            timestamp: Utc::now(),
            level: Level::Error,
            message: "order handler exploded".to_string(),
            error_chain: vec!["invalid order total".to_string()],
            tags: BTreeMap::from([(
                "messenger.receiver_name".to_string(),
                "async".to_string(),
            )]),
            breadcrumbs: vec![Breadcrumb::new("rust")],
            environment: Some("staging".to_string()),
            release: None,
        };

        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.id, event.id);
        assert_eq!(decoded.message, event.message);
        assert_eq!(decoded.error_chain, event.error_chain);
        assert_eq!(decoded.tags, event.tags);
        assert_eq!(decoded.environment.as_deref(), Some("staging"));
    }
}
