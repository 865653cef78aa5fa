//! Handlers for single-record `/students` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/students` | `?status`, `?barangay_id`, `?q`; sorted by barangay then name |
//! | `POST` | `/students` | Body: [`StudentForm`]; returns 201 + record |
//! | `GET`  | `/students/{id}` | `ETag` header |
//! | `PUT`  | `/students/{id}` | Body: [`StudentForm`]; optional `If-Match` |
//! | `POST` | `/students/{id}/archive` | `active` → `inactive` |
//! | `POST` | `/students/{id}/graduate` | `active` → `graduated` |
//! | `POST` | `/students/{id}/retrieve` | `inactive`/`graduated` → `active` |
//! | `DELETE` | `/students/{id}` | Permanent; non-active records only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use roster_core::{
  BarangayId, StudentId,
  lifecycle::{LifecycleAction, RemovalTicket, StudentStatus},
  manager::LifecycleManager,
  store::{StudentQuery, StudentStore},
  student::{Student, StudentForm},
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  etag::{compute_etag, if_match_satisfied},
};

pub(crate) fn parse_id(raw: &str) -> Result<StudentId, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("Invalid student id: {raw:?}")))
}

fn with_etag(status: StatusCode, student: Student) -> Response {
  let etag = compute_etag(&student);
  (status, [(header::ETAG, etag)], Json(student)).into_response()
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status:      Option<StudentStatus>,
  pub barangay_id: Option<BarangayId>,
  /// Substring match over name and LRN.
  pub q:           Option<String>,
}

impl From<ListParams> for StudentQuery {
  fn from(p: ListParams) -> Self {
    StudentQuery {
      status:      p.status,
      barangay_id: p.barangay_id,
      text:        p.q,
    }
  }
}

/// `GET /students[?status=...][&barangay_id=...][&q=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: StudentStore + 'static,
{
  let students = store
    .list_students(params.into())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(students))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /students`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<StudentForm>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: StudentStore + 'static,
{
  let Json(form) = body?;
  let student = LifecycleManager::new(store.as_ref()).add(form).await?;
  Ok(with_etag(StatusCode::CREATED, student))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /students/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: StudentStore + 'static,
{
  let id = parse_id(&id)?;
  let student = LifecycleManager::new(store.as_ref()).get(id).await?;
  Ok(with_etag(StatusCode::OK, student))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

/// `PUT /students/{id}`: replace the editable fields.
///
/// With `If-Match`, the write only happens if the record is unchanged since
/// the client read it; otherwise 412.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  body: Result<Json<StudentForm>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: StudentStore + 'static,
{
  let id = parse_id(&id)?;
  let Json(form) = body?;
  let manager = LifecycleManager::new(store.as_ref());

  if let Some(expected) = headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok()) {
    let current = manager.get(id).await?;
    if !if_match_satisfied(expected, &compute_etag(&current)) {
      tracing::debug!(student_id = %id, "If-Match mismatch");
      return Err(ApiError::PreconditionFailed);
    }
  }

  let student = manager.edit(id, form).await?;
  Ok(with_etag(StatusCode::OK, student))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

async fn transition<S>(store: &S, raw_id: &str, action: LifecycleAction) -> Result<Response, ApiError>
where
  S: StudentStore,
{
  let id = parse_id(raw_id)?;
  let student = LifecycleManager::new(store).transition(id, action).await?;
  Ok(with_etag(StatusCode::OK, student))
}

/// `POST /students/{id}/archive`
pub async fn archive<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: StudentStore + 'static,
{
  transition(store.as_ref(), &id, LifecycleAction::Archive).await
}

/// `POST /students/{id}/graduate`
pub async fn graduate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: StudentStore + 'static,
{
  transition(store.as_ref(), &id, LifecycleAction::Graduate).await
}

/// `POST /students/{id}/retrieve`
pub async fn retrieve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: StudentStore + 'static,
{
  transition(store.as_ref(), &id, LifecycleAction::Retrieve).await
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /students/{id}`: 204 on success.
///
/// Callers are expected to have collected both confirmations already.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: StudentStore + 'static,
{
  let id = parse_id(&id)?;
  let ticket = RemovalTicket::pre_confirmed([id])?;
  let mut report = LifecycleManager::new(store.as_ref()).remove(ticket).await?;

  match report.outcomes.pop() {
    Some(o) => match o.result.into_error(id, LifecycleAction::Remove) {
      Some(e) => Err(e.into()),
      None => Ok(StatusCode::NO_CONTENT),
    },
    None => Err(ApiError::Internal("removal produced no outcome".into())),
  }
}
