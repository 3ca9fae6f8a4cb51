//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::multipart::MultipartError,
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

  #[error(transparent)]
  Distribution(#[from] allot_core::Error),

  #[error(transparent)]
  Ingest(#[from] allot_ingest::Error),

  #[error("upload error: {0}")]
  Multipart(#[from] MultipartError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Wrap a backend error. A domain error anywhere in its source chain (a
  /// duplicate email caught by a unique constraint, say) is surfaced as that
  /// domain error instead.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&e);
    while let Some(err) = cause {
      if let Some(core) = err.downcast_ref::<allot_core::Error>() {
        return ApiError::Distribution(core.clone());
      }
      cause = err.source();
    }
    ApiError::Store(Box::new(e))
  }

  fn status(&self) -> StatusCode {
    use allot_core::Error as Core;

    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) | ApiError::Ingest(_) => StatusCode::BAD_REQUEST,
      ApiError::Distribution(
        Core::EmptyRoster
        | Core::EmptyInput
        | Core::Validation(_)
        | Core::DuplicateEmail(_),
      ) => StatusCode::BAD_REQUEST,
      ApiError::Distribution(Core::InvariantViolation(_)) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      ApiError::Multipart(e) => e.status(),
      ApiError::Store(_) | ApiError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::NotFound(m) | ApiError::BadRequest(m) => m.clone(),
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum BackendError {
    #[error("core error: {0}")]
    Core(#[from] allot_core::Error),
    #[error("disk on fire")]
    Io,
  }

  #[test]
  fn domain_error_inside_store_error_keeps_its_status() {
    let err = ApiError::store(BackendError::from(
      allot_core::Error::DuplicateEmail("ada@example.com".into()),
    ));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Agent with this email already exists");
  }

  #[test]
  fn other_store_errors_are_internal() {
    let err = ApiError::store(BackendError::Io);
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }
}
