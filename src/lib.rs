//! FSRS memory-state scheduler for exam-preparation reviews.
//!
//! Given a learner's rating of an item and the item's previous memory
//! state, [`Scheduler::review`] returns the updated state and the next
//! review date. Nothing is persisted here: callers store the returned
//! [`MemoryState`] keyed by (learner, item) and pass it back on the next
//! review.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use prep_srs::{Rating, ReviewEvent, Scheduler};
//!
//! let scheduler = Scheduler::default();
//! let now = Utc.with_ymd_and_hms(2026, 2, 14, 10, 0, 0).unwrap();
//!
//! let first = scheduler.review(&ReviewEvent::new(Rating::Good, now));
//! assert_eq!(first.repetitions, 1);
//!
//! let later = first.next_review;
//! let second = scheduler.review(&ReviewEvent::new(Rating::Easy, later).with_state(first.state));
//! assert!(second.interval_days >= first.interval_days);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod paths;
pub mod profiling;
pub mod srs;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::SchedulerConfig;
pub use domain::{
    MemoryState, Preview, RawRating, Rating, ReplayEntry, ReviewEvent, ReviewOutcome,
    ReviewRequest,
};
pub use error::{ConfigError, SchedulerError};
pub use srs::{review, FormulaVersion, Scheduler, Sm2Record};
