//! Event types for profiling.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A profiling event with timestamp and optional duration.
#[derive(Serialize)]
pub struct ProfileEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// Duration in microseconds (for timed events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
}

impl ProfileEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            duration_us: None,
        }
    }

    pub fn with_duration(event_type: EventType, duration: std::time::Duration) -> Self {
        Self {
            duration_us: Some(duration.as_micros() as u64),
            ..Self::new(event_type)
        }
    }
}

/// Types of events that can be logged.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    // === Session lifecycle ===
    SessionStart {
        session_id: String,
    },
    SessionEnd {
        /// Total events logged
        total_events: u64,
    },

    // === Handler lifecycle ===
    HandlerStart {
        /// Route path (e.g., "/review")
        route: String,
    },
    HandlerEnd {
        route: String,
        /// HTTP status of the response
        status: u16,
    },

    // === Scheduling ===
    /// One review scheduled by the memory scheduler
    ReviewScheduled {
        version: String,
        rating: String,
        is_new: bool,
        interval_days: u32,
    },

    // === Generic ===
    TimedScope {
        name: String,
        duration_ms: u64,
    },
}
