//! Structured logging for the Shaman relay and client.
//!
//! Handles credential redaction, JSON file output with daily rotation, and
//! per-turn event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, TurnEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
