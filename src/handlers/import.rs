//! Legacy data import endpoints.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::domain::MemoryState;
use crate::error::SchedulerError;
use crate::srs::Sm2Record;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sm2ImportRequest {
  #[serde(flatten)]
  pub record: Sm2Record,
  /// Retention the SM-2 schedule is assumed to have achieved (default 0.9)
  #[serde(default)]
  pub sm2_retention: Option<f64>,
}

/// Convert a graduated SM-2 card into a memory state.
///
/// POST /import/sm2
pub async fn import_sm2(
  State(state): State<AppState>,
  Json(request): Json<Sm2ImportRequest>,
) -> Result<Json<MemoryState>, SchedulerError> {
  let imported = state
    .scheduler
    .import_sm2(&request.record, request.sm2_retention)?;
  tracing::debug!(
    "Imported SM-2 card: ease {} interval {}d -> S={:.2} D={:.2}",
    request.record.ease_factor,
    request.record.interval_days,
    imported.stability,
    imported.difficulty
  );
  Ok(Json(imported))
}
