//! Import of legacy SM-2 records.
//!
//! Centers moving from an SM-2 based tool keep each learner's progress: the
//! SM-2 interval is read as the time the item was expected to stay above
//! the SM-2 retention, and the ease factor is inverted through the recall
//! stability formula to recover a difficulty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::memory::{clamp_difficulty, clamp_stability};
use crate::domain::MemoryState;
use crate::error::SchedulerError;

use super::formulas::{clamp_retention, interval_scale};
use super::params::{FormulaVersion, Weights, S_MIN};

/// SM-2 ease factor floor.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Retention SM-2 schedules are assumed to have achieved.
pub const DEFAULT_SM2_RETENTION: f64 = 0.9;

/// A graduated card as an SM-2 scheduler stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sm2Record {
  pub ease_factor: f64,
  pub interval_days: i64,
  #[serde(default)]
  pub repetitions: u32,
  #[serde(default)]
  pub lapses: u32,
  pub last_reviewed_at: DateTime<Utc>,
}

/// Estimate an FSRS memory state from an SM-2 record.
///
/// Only graduated cards carry usable SM-2 data: a non-positive interval or
/// ease factor is rejected.
pub fn memory_state_from_sm2(
  record: &Sm2Record,
  version: FormulaVersion,
  weights: &Weights,
  sm2_retention: f64,
) -> Result<MemoryState, SchedulerError> {
  if record.interval_days <= 0 {
    return Err(SchedulerError::InvalidSm2Record(format!(
      "interval must be positive, got {}",
      record.interval_days
    )));
  }
  if !record.ease_factor.is_finite() || record.ease_factor <= 0.0 {
    return Err(SchedulerError::InvalidSm2Record(format!(
      "ease factor must be positive, got {}",
      record.ease_factor
    )));
  }

  let w = weights.table(version);
  let r = clamp_retention(sm2_retention);
  let ease = record.ease_factor.max(MIN_EASE_FACTOR);

  // interval = S * scale(r)  =>  S = interval / scale(r)
  let stability = clamp_stability((record.interval_days as f64).max(S_MIN) / interval_scale(r));

  // ease - 1 is the growth SM-2 applied; solve the recall formula for D
  let growth_per_difficulty = w[8].exp() * stability.powf(-w[9]) * ((1.0 - r) * w[10]).exp_m1();
  let difficulty = clamp_difficulty(11.0 - (ease - 1.0) / growth_per_difficulty);

  Ok(MemoryState {
    version,
    stability,
    difficulty,
    lapses: record.lapses,
    repetitions: record.repetitions,
    last_reviewed_at: record.last_reviewed_at,
  })
}
