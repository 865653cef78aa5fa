//! `GET /students/export`: the masterlist as CSV.
//!
//! Accepts the same filters as `GET /students`. Rows follow the table order
//! (barangay name, then student name).

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::{Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use roster_core::{
  BarangayId,
  barangay::Barangay,
  store::StudentStore,
  student::{Student, sort_for_table},
};

use crate::{error::ApiError, students::ListParams};

const HEADER: [&str; 10] = [
  "LRN",
  "Name",
  "Last Name",
  "First Name",
  "Middle Name",
  "Gender",
  "Birthday",
  "Barangay",
  "Address",
  "Status",
];

/// Render `students` as CSV bytes, header row first.
pub fn write_csv(students: &[Student], barangays: &[Barangay]) -> Result<Vec<u8>, csv::Error> {
  let names: HashMap<BarangayId, &str> = barangays
    .iter()
    .map(|b| (b.barangay_id, b.name.as_str()))
    .collect();

  let mut wtr = csv::Writer::from_writer(Vec::new());
  wtr.write_record(HEADER)?;
  for s in students {
    let gender = s.gender.map(|g| g.to_string()).unwrap_or_default();
    let birthday = s
      .birthday
      .map(|d| d.format("%Y-%m-%d").to_string())
      .unwrap_or_default();
    wtr.write_record([
      s.lrn.as_str(),
      s.name.as_str(),
      s.last_name.as_str(),
      s.first_name.as_str(),
      s.middle_name.as_str(),
      gender.as_str(),
      birthday.as_str(),
      names.get(&s.barangay_id).copied().unwrap_or_default(),
      s.address.as_deref().unwrap_or_default(),
      s.status.as_ref(),
    ])?;
  }
  wtr.into_inner().map_err(|e| e.into_error().into())
}

/// `GET /students/export[?status=...][&barangay_id=...][&q=...]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Response, ApiError>
where
  S: StudentStore + 'static,
{
  let barangays = store.list_barangays().await.map_err(ApiError::store)?;
  let mut students = store
    .list_students(params.into())
    .await
    .map_err(ApiError::store)?;
  sort_for_table(&mut students, &barangays);

  let body = write_csv(&students, &barangays).map_err(|e| ApiError::Internal(e.to_string()))?;
  tracing::debug!(rows = students.len(), "masterlist exported");

  Ok(
    (
      [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (header::CONTENT_DISPOSITION, "attachment; filename=\"masterlist.csv\""),
      ],
      body,
    )
      .into_response(),
  )
}
