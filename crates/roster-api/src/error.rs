//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is JSON with a `message` field. Validation failures add an
//! `errors` array of `{field, message}` objects.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::validate::FieldError;
use serde_json::json;
use thiserror::Error;

const UNEXPECTED: &str = "An unexpected error occurred.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed")]
  Validation(Vec<FieldError>),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("precondition failed")]
  PreconditionFailed,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self {
    use roster_core::Error as E;

    match e {
      E::EmptySelection => Self::BadRequest("No students selected".into()),
      E::InvalidAction(_) => Self::BadRequest("Invalid action".into()),
      E::NotFound(id) => Self::NotFound(format!("Student {id} not found")),
      E::BarangayNotFound(id) => Self::BadRequest(format!("Barangay {id} does not exist")),
      E::Validation(errors) => Self::Validation(errors),
      e @ (E::InvalidTransition { .. } | E::ConfirmationInProgress | E::NoPendingConfirmation) => {
        Self::Conflict(e.to_string())
      }
      E::StoreFailure(msg) => Self::Internal(msg),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "message": m }))),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, Json(json!({ "message": m }))),
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Validation failed", "errors": errors })),
      ),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, Json(json!({ "message": m }))),
      ApiError::PreconditionFailed => (
        StatusCode::PRECONDITION_FAILED,
        Json(json!({ "message": "Record was modified since it was read" })),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "message": UNEXPECTED })),
        )
      }
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "message": UNEXPECTED })),
        )
      }
    }
    .into_response()
  }
}
