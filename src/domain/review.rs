use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::memory::MemoryState;
use crate::error::SchedulerError;

/// Learner's self-graded recall of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
  /// Failed recall (a lapse)
  Again = 1,
  Hard = 2,
  Good = 3,
  Easy = 4,
}

impl Rating {
  pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

  /// Numeric grade G used by the formulas (1-4).
  pub fn grade(&self) -> f64 {
    *self as u8 as f64
  }

  /// Position in rating-indexed tables (0-3).
  pub fn index(&self) -> usize {
    *self as usize - 1
  }

  pub fn is_fail(&self) -> bool {
    matches!(self, Self::Again)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Again => "again",
      Self::Hard => "hard",
      Self::Good => "good",
      Self::Easy => "easy",
    }
  }

  pub fn from_value(value: i64) -> Result<Self, SchedulerError> {
    match value {
      1 => Ok(Self::Again),
      2 => Ok(Self::Hard),
      3 => Ok(Self::Good),
      4 => Ok(Self::Easy),
      other => Err(SchedulerError::InvalidRating(other.to_string())),
    }
  }
}

impl FromStr for Rating {
  type Err = SchedulerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
      return Self::from_value(value);
    }
    match trimmed.to_ascii_lowercase().as_str() {
      "again" | "fail" => Ok(Self::Again),
      "hard" => Ok(Self::Hard),
      "good" => Ok(Self::Good),
      "easy" => Ok(Self::Easy),
      _ => Err(SchedulerError::InvalidRating(s.to_string())),
    }
  }
}

/// A rating as it arrives from a caller, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRating {
  Value(i64),
  Name(String),
  Other(serde_json::Value),
}

impl TryFrom<&RawRating> for Rating {
  type Error = SchedulerError;

  fn try_from(raw: &RawRating) -> Result<Self, Self::Error> {
    match raw {
      RawRating::Value(value) => Rating::from_value(*value),
      RawRating::Name(name) => name.parse(),
      RawRating::Other(value) => Err(SchedulerError::InvalidRating(value.to_string())),
    }
  }
}

impl From<Rating> for RawRating {
  fn from(rating: Rating) -> Self {
    RawRating::Name(rating.as_str().to_string())
  }
}

/// One review to schedule. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEvent {
  pub rating: Rating,
  pub now: DateTime<Utc>,
  /// None for an item seen for the first time
  pub previous_state: Option<MemoryState>,
  /// Overrides `previous_state.repetitions` when present
  pub previous_repetitions: Option<u32>,
}

impl ReviewEvent {
  pub fn new(rating: Rating, now: DateTime<Utc>) -> Self {
    Self {
      rating,
      now,
      previous_state: None,
      previous_repetitions: None,
    }
  }

  pub fn with_state(mut self, state: MemoryState) -> Self {
    self.previous_state = Some(state);
    self
  }

  pub fn with_repetitions(mut self, repetitions: u32) -> Self {
    self.previous_repetitions = Some(repetitions);
    self
  }
}

/// Wire form of [`ReviewEvent`] carrying an unvalidated rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
  pub rating: RawRating,
  pub now: DateTime<Utc>,
  #[serde(default)]
  pub previous_state: Option<MemoryState>,
  #[serde(default)]
  pub previous_repetitions: Option<u32>,
}

impl TryFrom<ReviewRequest> for ReviewEvent {
  type Error = SchedulerError;

  fn try_from(request: ReviewRequest) -> Result<Self, Self::Error> {
    Ok(Self {
      rating: Rating::try_from(&request.rating)?,
      now: request.now,
      previous_state: request.previous_state,
      previous_repetitions: request.previous_repetitions,
    })
  }
}

/// Result of scheduling one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
  pub state: MemoryState,
  /// Whole days until the next review, at least 1
  pub interval_days: u32,
  /// `now + interval_days` days
  pub next_review: DateTime<Utc>,
  pub repetitions: u32,
  /// Recall probability at the moment of the review (1.0 for new items)
  pub retrievability: f64,
}

/// Outcome of every possible rating for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
  pub again: ReviewOutcome,
  pub hard: ReviewOutcome,
  pub good: ReviewOutcome,
  pub easy: ReviewOutcome,
}

impl Preview {
  pub fn get(&self, rating: Rating) -> &ReviewOutcome {
    match rating {
      Rating::Again => &self.again,
      Rating::Hard => &self.hard,
      Rating::Good => &self.good,
      Rating::Easy => &self.easy,
    }
  }
}

/// One line of an item's review log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayEntry {
  pub rating: Rating,
  pub reviewed_at: DateTime<Utc>,
}
