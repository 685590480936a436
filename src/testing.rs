//! Test fixtures.
//!
//! Compiled for unit tests and, with the `testing` feature, for downstream
//! crates that want the same helpers.

use chrono::{DateTime, Utc};

use crate::domain::MemoryState;
use crate::srs::FormulaVersion;

/// Parse an RFC 3339 timestamp. Panics on malformed input.
pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp)
        .unwrap_or_else(|e| panic!("bad fixture timestamp {:?}: {}", timestamp, e))
        .with_timezone(&Utc)
}

/// A stored state with zeroed counters.
pub fn state(
    version: FormulaVersion,
    stability: f64,
    difficulty: f64,
    last_reviewed_at: DateTime<Utc>,
) -> MemoryState {
    MemoryState {
        version,
        stability,
        difficulty,
        lapses: 0,
        repetitions: 0,
        last_reviewed_at,
    }
}
