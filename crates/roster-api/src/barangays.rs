//! Handlers for `/barangays` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/barangays` | Sorted by name |
//! | `POST` | `/barangays` | Body: `{"name":"..."}` |
//! | `GET`  | `/barangays/stats` | Enrollment overview; optional `?status` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  barangay::{Barangay, EnrollmentOverview, enrollment_overview},
  lifecycle::StudentStatus,
  store::{StudentQuery, StudentStore},
  validate::FieldError,
};
use serde::Deserialize;

use crate::error::ApiError;

const MAX_BARANGAY_NAME_LEN: usize = 100;

/// `GET /barangays`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Barangay>>, ApiError>
where
  S: StudentStore + 'static,
{
  let barangays = store.list_barangays().await.map_err(ApiError::store)?;
  Ok(Json(barangays))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /barangays`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: StudentStore + 'static,
{
  let Json(body) = body?;
  let name = body.name.trim();
  if name.is_empty() {
    return Err(ApiError::Validation(vec![FieldError::new(
      "name",
      "Barangay name is required",
    )]));
  }
  if name.chars().count() > MAX_BARANGAY_NAME_LEN {
    return Err(ApiError::Validation(vec![FieldError::new(
      "name",
      format!("Barangay name must be less than {MAX_BARANGAY_NAME_LEN} characters"),
    )]));
  }

  let barangay = store
    .add_barangay(name.to_owned())
    .await
    .map_err(ApiError::store)?;
  tracing::info!(barangay_id = %barangay.barangay_id, name = %barangay.name, "barangay added");
  Ok((StatusCode::CREATED, Json(barangay)))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
  pub status: Option<StudentStatus>,
}

/// `GET /barangays/stats[?status=...]`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<StatsParams>,
) -> Result<Json<EnrollmentOverview>, ApiError>
where
  S: StudentStore + 'static,
{
  let barangays = store.list_barangays().await.map_err(ApiError::store)?;
  let students = store
    .list_students(StudentQuery {
      status: params.status,
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(enrollment_overview(
    &barangays,
    students.iter().map(|s| s.barangay_id),
  )))
}
