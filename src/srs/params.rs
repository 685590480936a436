//! Formula tables for the memory model.
//!
//! Every tunable number the scheduler uses lives here. Weight tables are
//! indexed the way the published FSRS papers index them (`w[0]..w[n]`):
//!
//! - `w0..w3`: initial stability for Again/Hard/Good/Easy
//! - `w4..w7`: initial difficulty, difficulty delta, mean reversion
//! - `w8..w10`: recall stability growth
//! - `w11..w14`: post-lapse stability
//! - `w15`, `w16`: hard penalty, easy bonus
//! - `w17`, `w18`: same-day stability (fsrs-5 only)

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// Exponent of the power forgetting curve.
pub const DECAY: f64 = -0.5;

/// Scales elapsed time so that retrievability is exactly 0.9 when
/// elapsed days equal stability: `(1 + 19/81)^-0.5 = 0.9`.
pub const FACTOR: f64 = 19.0 / 81.0;

/// Stability bounds in days.
pub const S_MIN: f64 = 0.01;
pub const S_MAX: f64 = 36500.0;

/// Difficulty bounds.
pub const D_MIN: f64 = 1.0;
pub const D_MAX: f64 = 10.0;

/// Substituted for a stored difficulty that is not a number.
pub const FALLBACK_DIFFICULTY: f64 = 5.0;

/// Recall probability targeted when computing intervals.
pub const DEFAULT_DESIRED_RETENTION: f64 = 0.9;
pub const MIN_DESIRED_RETENTION: f64 = 0.70;
pub const MAX_DESIRED_RETENTION: f64 = 0.99;

/// Upper bound on a scheduled interval (10 years).
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 3650;

/// Elapsed time below which an fsrs-5 review counts as same-day.
pub const SAME_DAY_THRESHOLD_DAYS: f64 = 1.0;

/// FSRS-4.5 default weights.
pub const FSRS_4_5_WEIGHTS: [f64; 17] = [
  0.4872, 1.4003, 3.7145, 13.8206, // w0-w3: initial stability
  5.1618, 1.2298, 0.8975, 0.031, // w4-w7: difficulty
  1.6474, 0.1367, 1.0461, // w8-w10: recall
  2.1072, 0.0793, 0.3246, 1.587, // w11-w14: lapse
  0.2272, 2.8755, // w15-w16: hard penalty, easy bonus
];

/// FSRS-5 default weights.
pub const FSRS_5_WEIGHTS: [f64; 19] = [
  0.40255, 1.18385, 3.173, 15.69105, // w0-w3: initial stability
  7.1949, 0.5345, 1.4604, 0.0046, // w4-w7: difficulty
  1.54575, 0.1192, 1.01925, // w8-w10: recall
  1.9395, 0.11, 0.29605, 2.2698, // w11-w14: lapse
  0.2315, 2.9898, // w15-w16: hard penalty, easy bonus
  0.51655, 0.6621, // w17-w18: same-day
];

/// Formula revision that produced a stored memory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FormulaVersion {
  #[serde(rename = "fsrs-4.5")]
  Fsrs45,
  #[default]
  #[serde(rename = "fsrs-5")]
  Fsrs5,
}

impl FormulaVersion {
  pub const ALL: [FormulaVersion; 2] = [FormulaVersion::Fsrs45, FormulaVersion::Fsrs5];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Fsrs45 => "fsrs-4.5",
      Self::Fsrs5 => "fsrs-5",
    }
  }
}

impl FromStr for FormulaVersion {
  type Err = SchedulerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "fsrs-4.5" => Ok(Self::Fsrs45),
      "fsrs-5" => Ok(Self::Fsrs5),
      _ => Err(SchedulerError::UnknownVersion(s.to_string())),
    }
  }
}

impl std::fmt::Display for FormulaVersion {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Per-version weight tables. Deployments may override either table in
/// config without touching the formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
  #[serde(rename = "fsrs-4.5")]
  pub fsrs_4_5: [f64; 17],
  #[serde(rename = "fsrs-5")]
  pub fsrs_5: [f64; 19],
}

impl Default for Weights {
  fn default() -> Self {
    Self {
      fsrs_4_5: FSRS_4_5_WEIGHTS,
      fsrs_5: FSRS_5_WEIGHTS,
    }
  }
}

impl Weights {
  /// Weight table for a formula version.
  pub fn table(&self, version: FormulaVersion) -> &[f64] {
    match version {
      FormulaVersion::Fsrs45 => &self.fsrs_4_5,
      FormulaVersion::Fsrs5 => &self.fsrs_5,
    }
  }

  /// First version whose table holds a NaN or infinite weight.
  pub fn first_non_finite(&self) -> Option<FormulaVersion> {
    FormulaVersion::ALL
      .into_iter()
      .find(|v| self.table(*v).iter().any(|w| !w.is_finite()))
  }
}
