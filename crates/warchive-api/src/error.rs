//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every outcome, success or failure, carries a JSON body with a
//! human-readable `message` field.

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
  /// Malformed id, missing required field, nothing to update, or a
  /// multipart decoding problem.
  #[error("{0}")]
  InvalidArgument(String),

  #[error("{0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("attachment error: {0}")]
  Files(#[from] warchive_files::Error),
}

impl From<warchive_core::Error> for ApiError {
  fn from(err: warchive_core::Error) -> Self {
    match err {
      warchive_core::Error::NotFound(_) => ApiError::NotFound(err.to_string()),
      _ => ApiError::InvalidArgument(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::InvalidArgument(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
      ApiError::Files(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
