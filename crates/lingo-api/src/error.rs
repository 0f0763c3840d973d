//! API error type, its mapping from [`lingo_core::Error`], and the
//! [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Backend detail is logged, never returned to the client.
  #[error("internal error")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<lingo_core::Error> for ApiError {
  fn from(e: lingo_core::Error) -> Self {
    use lingo_core::Error as E;
    match e {
      E::LessonNotFound(_) => ApiError::NotFound("Lesson not found".to_owned()),
      E::PathNotFound(_) => {
        ApiError::NotFound("Learning path not found".to_owned())
      }
      E::AlreadyCompleted { .. } => {
        ApiError::BadRequest("Lesson already completed".to_owned())
      }
      E::EmptyWallet => {
        ApiError::BadRequest("Missing required field: walletAddress".to_owned())
      }
      E::Serialization(e) => ApiError::Internal(Box::new(e)),
      E::Storage(e) => ApiError::Internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
