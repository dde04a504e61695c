//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body of the 400 returned for an empty or non-JSON submission.
pub const INVALID_PAYLOAD: &str = "Invalid or empty JSON payload";

/// Top-level message of the 500 returned when a submission cannot be stored.
pub const SAVE_FAILED: &str = "Failed to save asset";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Persisting a submission failed. Rendered with a `details` field.
  #[error("failed to save asset: {0}")]
  Save(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))),
      ApiError::Save(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": SAVE_FAILED, "details": e.to_string() })),
      ),
      ApiError::Store(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
      }
    }
    .into_response()
  }
}
