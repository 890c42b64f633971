//! Session Event Logger
//!
//! Workflow events (selection, prediction, history changes) emitted as
//! structured records under the `session_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    FileSelected {
        file_name: String,
        mime_type: String,
        bytes: usize,
    },
    FileRejected {
        file_name: String,
        mime_type: String,
    },
    PredictionSucceeded {
        record_id: i64,
        bytes: usize,
        elapsed_ms: u64,
    },
    PredictionFailed {
        error_msg: String,
    },
    HistoryCleared {
        removed: usize,
    },
    Published {
        user_id: String,
        result_url: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts free-text fields, then emits the event as one JSON record.
    pub fn log_event(session_id: &str, event: SessionEvent) -> EventLogEntry {
        let event = match event {
            SessionEvent::PredictionFailed { error_msg } => SessionEvent::PredictionFailed {
                error_msg: redact_sensitive_data(&error_msg),
            },
            SessionEvent::Published { user_id, result_url } => SessionEvent::Published {
                user_id,
                result_url: redact_sensitive_data(&result_url),
            },
            other => other,
        };

        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        };

        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "session_events", event = %json, "Session event"),
            Err(_) => info!(target: "session_events", event = ?entry, "Session event"),
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_are_redacted() {
        let entry = EventLogger::log_event(
            "s1",
            SessionEvent::PredictionFailed {
                error_msg: "upstream said Bearer abc.def.ghi".into(),
            },
        );
        match entry.event {
            SessionEvent::PredictionFailed { error_msg } => {
                assert!(!error_msg.contains("abc.def.ghi"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let entry = EventLogEntry {
            session_id: "s1".into(),
            timestamp: Utc::now(),
            event: SessionEvent::HistoryCleared { removed: 3 },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "history_cleared");
        assert_eq!(json["event"]["removed"], 3);
    }
}
