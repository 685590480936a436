//! HTTP surface of the scheduler.

pub mod import;
pub mod review;

use axum::{
  extract::State,
  routing::{get, post},
  Json, Router,
};

use crate::state::AppState;

pub use import::import_sm2;
pub use review::{preview, replay, retrievability, review};

/// Build the application router.
pub fn router(state: AppState) -> Router {
  let router = Router::new()
    .route("/health", get(health))
    .route("/review", post(review))
    .route("/preview", post(preview))
    .route("/retrievability", post(retrievability))
    .route("/replay", post(replay))
    .route("/import/sm2", post(import_sm2))
    .with_state(state);

  #[cfg(feature = "profiling")]
  let router = router.layer(axum::middleware::from_fn(profile_route));

  router
}

/// Emit start and end events around every request.
#[cfg(feature = "profiling")]
async fn profile_route(
  request: axum::extract::Request,
  next: axum::middleware::Next,
) -> axum::response::Response {
  use crate::profiling::EventType;

  let route = request.uri().path().to_string();
  crate::profile_log!(EventType::HandlerStart {
    route: route.clone()
  });
  let response = next.run(request).await;
  crate::profile_log!(EventType::HandlerEnd {
    route,
    status: response.status().as_u16()
  });
  response
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
  Json(serde_json::json!({
    "status": "ok",
    "version": state.scheduler.config().default_version.as_str(),
  }))
}
