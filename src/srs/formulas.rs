//! Stability, difficulty and retrievability formulas.
//!
//! Pure functions over a weight table. Version-specific shapes dispatch on
//! [`FormulaVersion`]; the shared pieces (forgetting curve, recall and lapse
//! stability) are identical across fsrs-4.5 and fsrs-5.

use crate::domain::memory::{clamp_difficulty, clamp_stability};
use crate::domain::Rating;

use super::params::{
  FormulaVersion, DECAY, FACTOR, MAX_DESIRED_RETENTION, MIN_DESIRED_RETENTION, S_MIN,
};

/// Recall probability after `elapsed_days` for an item of stability `s`.
///
/// Power forgetting curve `(1 + FACTOR * t / S)^DECAY`, equal to 0.9 when
/// `t == S`.
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
  let t = if elapsed_days.is_nan() { 0.0 } else { elapsed_days.max(0.0) };
  let s = clamp_stability(stability);
  (1.0 + FACTOR * t / s).powf(DECAY).clamp(0.0, 1.0)
}

/// Days-per-stability ratio for a target retention: inverts the forgetting
/// curve at `desired_retention`. Exactly 1.0 at 0.9.
pub fn interval_scale(desired_retention: f64) -> f64 {
  let r = clamp_retention(desired_retention);
  (r.powf(1.0 / DECAY) - 1.0) / FACTOR
}

/// Whole-day interval for stability `s`, clamped to `[1, maximum_interval]`.
pub fn next_interval(stability: f64, desired_retention: f64, maximum_interval: u32) -> u32 {
  let days = (clamp_stability(stability) * interval_scale(desired_retention)).round();
  let max = maximum_interval.max(1) as f64;
  days.clamp(1.0, max) as u32
}

pub fn clamp_retention(r: f64) -> f64 {
  if r.is_nan() {
    return super::params::DEFAULT_DESIRED_RETENTION;
  }
  r.clamp(MIN_DESIRED_RETENTION, MAX_DESIRED_RETENTION)
}

pub fn initial_stability(w: &[f64], rating: Rating) -> f64 {
  clamp_stability(w[rating.index()])
}

/// Difficulty of a new item, before clamping.
fn raw_initial_difficulty(version: FormulaVersion, w: &[f64], rating: Rating) -> f64 {
  let g = rating.grade();
  match version {
    FormulaVersion::Fsrs45 => w[4] - (g - 3.0) * w[5],
    FormulaVersion::Fsrs5 => w[4] - (w[5] * (g - 1.0)).exp() + 1.0,
  }
}

pub fn initial_difficulty(version: FormulaVersion, w: &[f64], rating: Rating) -> f64 {
  clamp_difficulty(raw_initial_difficulty(version, w, rating))
}

/// Applies the rating delta, then reverts a `w7` share of the distance
/// toward the version's anchor difficulty.
pub fn next_difficulty(version: FormulaVersion, w: &[f64], d: f64, rating: Rating) -> f64 {
  let d = clamp_difficulty(d);
  let delta = -w[6] * (rating.grade() - 3.0);
  let next = match version {
    FormulaVersion::Fsrs45 => {
      let anchor = raw_initial_difficulty(version, w, Rating::Good);
      w[7] * anchor + (1.0 - w[7]) * (d + delta)
    }
    FormulaVersion::Fsrs5 => {
      // linear damping: steps shrink as d approaches 10
      let damped = d + delta * (10.0 - d) / 9.0;
      let anchor = raw_initial_difficulty(version, w, Rating::Easy);
      w[7] * anchor + (1.0 - w[7]) * damped
    }
  };
  clamp_difficulty(next)
}

/// Stability after a successful long-term review. Growth shrinks as
/// stability rises (`S^-w9`) and grows with forgetting (`1 - R`).
pub fn recall_stability(w: &[f64], d: f64, s: f64, r: f64, rating: Rating) -> f64 {
  let d = clamp_difficulty(d);
  let s = clamp_stability(s);
  let hard_penalty = if rating == Rating::Hard { w[15] } else { 1.0 };
  let easy_bonus = if rating == Rating::Easy { w[16] } else { 1.0 };

  let growth = w[8].exp()
    * (11.0 - d)
    * s.powf(-w[9])
    * ((1.0 - r) * w[10]).exp_m1()
    * hard_penalty
    * easy_bonus;
  clamp_stability(s * (1.0 + growth))
}

/// Stability after a lapse. Never exceeds the previous stability.
pub fn forget_stability(w: &[f64], d: f64, s: f64, r: f64) -> f64 {
  let d = clamp_difficulty(d);
  let s = clamp_stability(s);
  let next = w[11] * d.powf(-w[12]) * ((s + 1.0).powf(w[13]) - 1.0) * ((1.0 - r) * w[14]).exp();
  clamp_stability(next.min(s)).max(S_MIN)
}

/// fsrs-5 stability for a review less than a day after the previous one.
///
/// The flat `e^(w17 * (G - 3 + w18))` factor is capped by the long-term
/// recall value at the same retrievability. Cramming within a day can then
/// never outgrow a review taken a day later, and the cap inherits the
/// `S^-w9` damping of [`recall_stability`].
pub fn short_term_stability(w: &[f64], d: f64, s: f64, r: f64, rating: Rating) -> f64 {
  let s = clamp_stability(s);
  let short = clamp_stability(s * (w[17] * (rating.grade() - 3.0 + w[18])).exp());
  short.min(recall_stability(w, d, s, r, rating))
}
