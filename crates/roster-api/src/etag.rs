//! ETag computation for student resources.
//!
//! An ETag is a SHA-256 hash over the record id and its `updated_at`
//! timestamp, so every successful write yields a new tag.

use roster_core::student::Student;
use sha2::{Digest, Sha256};

pub fn compute_etag(student: &Student) -> String {
  let mut hasher = Sha256::new();
  hasher.update(student.student_id.as_uuid().as_bytes());
  hasher.update(student.updated_at.timestamp_micros().to_le_bytes());
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Compare an `If-Match` value against `etag`.
///
/// `*` matches any existing record; quotes and a weak `W/` prefix are ignored.
pub fn if_match_satisfied(header: &str, etag: &str) -> bool {
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || strip_etag_quotes(candidate) == strip_etag_quotes(etag)
  })
}

fn strip_etag_quotes(s: &str) -> &str { s.trim_start_matches("W/").trim_matches('"') }

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use roster_core::{
    BarangayId, StudentId, lifecycle::StudentStatus, student::DEFAULT_IMAGE,
  };

  use super::*;

  fn student(updated_secs: i64) -> Student {
    let ts = Utc.timestamp_opt(updated_secs, 0).unwrap();
    Student {
      student_id:  StudentId::default(),
      lrn:         "123456789012".into(),
      name:        "Rizal, Jose".into(),
      last_name:   "Rizal".into(),
      first_name:  "Jose".into(),
      middle_name: String::new(),
      gender:      None,
      birthday:    None,
      address:     None,
      barangay_id: BarangayId::default(),
      assessment:  String::new(),
      image:       DEFAULT_IMAGE.into(),
      status:      StudentStatus::Active,
      created_at:  ts,
      updated_at:  ts,
    }
  }

  #[test]
  fn update_changes_etag() {
    let a = student(1000);
    let mut b = a.clone();
    b.updated_at = Utc.timestamp_opt(2000, 0).unwrap();
    assert_ne!(compute_etag(&a), compute_etag(&b));
    assert_eq!(compute_etag(&a), compute_etag(&a.clone()));
  }

  #[test]
  fn if_match_accepts_quoted_unquoted_and_wildcard() {
    let etag = compute_etag(&student(1000));
    let bare = etag.trim_matches('"').to_owned();
    assert!(if_match_satisfied(&etag, &etag));
    assert!(if_match_satisfied(&bare, &etag));
    assert!(if_match_satisfied("*", &etag));
    assert!(if_match_satisfied(&format!("\"stale\", {etag}"), &etag));
    assert!(!if_match_satisfied("\"stale\"", &etag));
  }
}
