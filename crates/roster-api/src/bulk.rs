//! Bulk lifecycle endpoints.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/students/bulk` | `{"studentIds": [...], "action": "archive" \| "delete" \| "retrieve"}` |
//! | `POST` | `/students/bulk/graduate` | `{"studentIds": [...]}` |
//!
//! Every id is attempted on its own. The response carries aggregate counts and
//! one result per requested id; only a request-level failure, or a batch in
//! which every id hit a store failure, answers 500.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use roster_core::{
  StudentId,
  lifecycle::{
    BatchReport, BatchRequest, BulkAction, Completion, LifecycleAction, RecordOutcome,
    RemovalTicket, Selection,
  },
  manager::LifecycleManager,
  store::StudentStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, students::parse_id};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkBody {
  pub student_ids: Vec<String>,
  pub action:      String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraduateBody {
  pub student_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse {
  pub success:         bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub modified_count:  Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deleted_count:   Option<u64>,
  pub requested_count: usize,
  pub completion:      Completion,
  pub results:         Vec<RecordOutcome>,
}

impl BulkResponse {
  fn from_report(report: BatchReport) -> Self {
    let completion = report.completion();
    let removal = report.action == LifecycleAction::Remove;
    Self {
      success: completion != Completion::Failed,
      modified_count: (!removal).then_some(report.modified_count),
      deleted_count: removal.then_some(report.deleted_count),
      requested_count: report.requested,
      completion,
      results: report.outcomes,
    }
  }
}

fn parse_ids(raw: &[String]) -> Result<Vec<StudentId>, ApiError> {
  if raw.is_empty() {
    return Err(roster_core::Error::EmptySelection.into());
  }
  raw.iter().map(|s| parse_id(s)).collect()
}

async fn run<S>(store: &S, ids: Vec<StudentId>, action: LifecycleAction) -> Result<Json<BulkResponse>, ApiError>
where
  S: StudentStore,
{
  let manager = LifecycleManager::new(store);
  let report = match action {
    LifecycleAction::Remove => manager.remove(RemovalTicket::pre_confirmed(ids)?).await?,
    action => {
      manager
        .apply_batch(BatchRequest::new(Selection::batch(ids), action)?)
        .await?
    }
  };

  if report.all_store_failures() {
    return Err(ApiError::Internal(format!(
      "every record in the {action} batch failed in the store"
    )));
  }
  Ok(Json(BulkResponse::from_report(report)))
}

/// `POST /students/bulk`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<BulkBody>, JsonRejection>,
) -> Result<Json<BulkResponse>, ApiError>
where
  S: StudentStore + 'static,
{
  let Json(body) = body?;
  if body.student_ids.is_empty() {
    return Err(roster_core::Error::EmptySelection.into());
  }
  let action = BulkAction::parse(&body.action)?;
  let ids = parse_ids(&body.student_ids)?;

  tracing::info!(%action, count = ids.len(), "bulk request");
  run(store.as_ref(), ids, action.into()).await
}

/// `POST /students/bulk/graduate`
pub async fn graduate<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<GraduateBody>, JsonRejection>,
) -> Result<Json<BulkResponse>, ApiError>
where
  S: StudentStore + 'static,
{
  let Json(body) = body?;
  let ids = parse_ids(&body.student_ids)?;

  tracing::info!(count = ids.len(), "bulk graduate request");
  run(store.as_ref(), ids, LifecycleAction::Graduate).await
}
