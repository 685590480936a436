//! Scheduling endpoints.
//!
//! Thin JSON wrappers over [`Scheduler`](crate::srs::Scheduler). Callers own
//! storage: they send the stored state with each request and write the
//! returned state back under the same (learner, item) key.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MemoryState, Preview, RawRating, Rating, ReplayEntry, ReviewOutcome, ReviewRequest};
use crate::error::SchedulerError;
use crate::state::AppState;

// ============================================================================
// Review
// ============================================================================

/// Schedule one review.
///
/// POST /review
pub async fn review(
  State(state): State<AppState>,
  Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewOutcome>, SchedulerError> {
  let outcome = state.scheduler.review_request(request)?;
  Ok(Json(outcome))
}

// ============================================================================
// Preview
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
  pub now: DateTime<Utc>,
  #[serde(default)]
  pub previous_state: Option<MemoryState>,
  #[serde(default)]
  pub previous_repetitions: Option<u32>,
}

/// Outcomes for all four ratings.
///
/// POST /preview
pub async fn preview(
  State(state): State<AppState>,
  Json(request): Json<PreviewRequest>,
) -> Json<Preview> {
  Json(state.scheduler.preview(
    request.now,
    request.previous_state.as_ref(),
    request.previous_repetitions,
  ))
}

// ============================================================================
// Retrievability
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RetrievabilityRequest {
  pub state: MemoryState,
  pub now: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RetrievabilityResponse {
  pub retrievability: f64,
}

/// Current recall probability of a stored state.
///
/// POST /retrievability
pub async fn retrievability(
  State(state): State<AppState>,
  Json(request): Json<RetrievabilityRequest>,
) -> Json<RetrievabilityResponse> {
  Json(RetrievabilityResponse {
    retrievability: state.scheduler.retrievability(&request.state, request.now),
  })
}

// ============================================================================
// Replay
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRequestEntry {
  pub rating: RawRating,
  pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ReplayRequest {
  pub entries: Vec<ReplayRequestEntry>,
}

/// Rebuild a state from an item's review log (offline sync, formula
/// upgrades). Entries need not be sorted.
///
/// POST /replay
pub async fn replay(
  State(state): State<AppState>,
  Json(request): Json<ReplayRequest>,
) -> Result<Json<ReviewOutcome>, SchedulerError> {
  let entries = request
    .entries
    .iter()
    .map(|entry| {
      Ok(ReplayEntry {
        rating: Rating::try_from(&entry.rating)?,
        reviewed_at: entry.reviewed_at,
      })
    })
    .collect::<Result<Vec<_>, SchedulerError>>()?;

  let outcome = crate::profile_scope!("replay", { state.scheduler.replay(&entries) });
  outcome.map(Json).ok_or(SchedulerError::EmptyReplay)
}
