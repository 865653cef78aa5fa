//! Barangay: the geographic grouping students are listed under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BarangayId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barangay {
  pub barangay_id: BarangayId,
  pub name:        String,
  pub created_at:  DateTime<Utc>,
}

/// Per-barangay head count for the enrollment overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarangayCount {
  pub barangay_id: BarangayId,
  pub name:        String,
  pub count:       usize,
  /// Share of the total, rounded to one decimal place.
  pub percentage:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentOverview {
  pub total:     usize,
  pub barangays: Vec<BarangayCount>,
}

/// Count `barangay_ids` (one entry per student) against `barangays`.
///
/// Barangays with no students are left out. Students pointing at an unknown
/// barangay are not counted.
pub fn enrollment_overview(
  barangays: &[Barangay],
  barangay_ids: impl IntoIterator<Item = BarangayId>,
) -> EnrollmentOverview {
  let mut counts = std::collections::HashMap::<BarangayId, usize>::new();
  for id in barangay_ids {
    *counts.entry(id).or_default() += 1;
  }

  let mut rows: Vec<BarangayCount> = barangays
    .iter()
    .filter_map(|b| {
      let count = counts.get(&b.barangay_id).copied().unwrap_or(0);
      (count > 0).then(|| BarangayCount {
        barangay_id: b.barangay_id,
        name: b.name.clone(),
        count,
        percentage: 0.0,
      })
    })
    .collect();

  let total: usize = rows.iter().map(|r| r.count).sum();
  for row in &mut rows {
    row.percentage = (row.count as f64 * 1000.0 / total as f64).round() / 10.0;
  }

  EnrollmentOverview { total, barangays: rows }
}

/// Sort barangays alphabetically, case-insensitively.
pub fn sort_by_name(barangays: &mut [Barangay]) {
  barangays.sort_by_cached_key(|b| b.name.to_lowercase());
}
