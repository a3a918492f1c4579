//! Turn Event Logger
//!
//! Structured events (relay call, rendered reply, error) written through
//! `tracing` under the `turn_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shaman_core::Mode;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum TurnEvent {
    RelayCall {
        status: u16,
        latency_ms: u64,
    },
    Reply {
        mode: Mode,
        regions: Vec<String>,
    },
    Error {
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub turn_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: TurnEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Build the log entry for an event, redacting error text.
    pub fn entry(turn_id: &str, mut event: TurnEvent) -> EventLogEntry {
        if let TurnEvent::Error { error_msg } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }

        EventLogEntry {
            turn_id: turn_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Log a turn's event through the tracing system.
    pub fn log_event(turn_id: &str, event: TurnEvent) {
        let entry = Self::entry(turn_id, event);
        info!(target: "turn_events", event = ?entry, "Turn event");
    }
}
