use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::params::{FormulaVersion, D_MAX, D_MIN, FALLBACK_DIFFICULTY, S_MAX, S_MIN};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Memory model of one learner-item pair.
///
/// Created on the item's first review and replaced wholesale on every
/// review after that. The caller stores it keyed by (learner, item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
  /// Formula revision that produced this state
  pub version: FormulaVersion,
  /// Days until recall probability decays to 0.9
  pub stability: f64,
  /// Intrinsic hardness, 1 (easiest) to 10
  pub difficulty: f64,
  /// Reviews rated Again over the item's lifetime
  pub lapses: u32,
  /// Consecutive successful reviews since the last lapse
  #[serde(default)]
  pub repetitions: u32,
  pub last_reviewed_at: DateTime<Utc>,
}

impl MemoryState {
  /// Fractional days from the last review to `now`.
  ///
  /// A `now` earlier than `last_reviewed_at` counts as zero elapsed time;
  /// callers must submit reviews in temporal order.
  pub fn elapsed_days(&self, now: DateTime<Utc>) -> f64 {
    elapsed_days(self.last_reviewed_at, now)
  }

  /// Stability clamped to `[S_MIN, S_MAX]`, NaN mapped to `S_MIN`.
  pub fn clamped_stability(&self) -> f64 {
    clamp_stability(self.stability)
  }

  /// Difficulty clamped to `[D_MIN, D_MAX]`, NaN mapped to the midpoint.
  pub fn clamped_difficulty(&self) -> f64 {
    clamp_difficulty(self.difficulty)
  }
}

pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
  let ms = (to - from).num_milliseconds() as f64;
  (ms / MS_PER_DAY).max(0.0)
}

pub fn clamp_stability(s: f64) -> f64 {
  if s.is_nan() {
    return S_MIN;
  }
  s.clamp(S_MIN, S_MAX)
}

pub fn clamp_difficulty(d: f64) -> f64 {
  if d.is_nan() {
    return FALLBACK_DIFFICULTY;
  }
  d.clamp(D_MIN, D_MAX)
}
