//! Structured logging for VisionQuest.
//!
//! Handles subscriber setup, log redaction, and workflow event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, SessionEvent};
pub use logger::{init_logger, LogGuard};
pub use redact::redact_sensitive_data;
