//! Error types.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use thiserror::Error;

/// Errors raised by scheduling operations.
///
/// Numeric edge cases are clamped, never reported. A review only fails on a
/// rating outside the four grades.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
  #[error("invalid rating: {0} (expected 1-4 or again/hard/good/easy)")]
  InvalidRating(String),

  #[error("invalid SM-2 record: {0}")]
  InvalidSm2Record(String),

  #[error("review log is empty")]
  EmptyReplay,

  #[error("unknown formula version: {0} (expected fsrs-4.5 or fsrs-5)")]
  UnknownVersion(String),
}

impl IntoResponse for SchedulerError {
  fn into_response(self) -> Response {
    (
      StatusCode::BAD_REQUEST,
      Json(serde_json::json!({ "error": self.to_string() })),
    )
      .into_response()
  }
}

/// Errors from loading a config file explicitly.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("IO error reading {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("parse error in config: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("invalid config value for {field}: {reason}")]
  Invalid { field: &'static str, reason: String },
}
