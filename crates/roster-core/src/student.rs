//! Student records and the form they are added and edited through.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  BarangayId, Result, StudentId,
  barangay::Barangay,
  lifecycle::StudentStatus,
  name::{self, NameSource, StudentName},
  validate,
};

pub const DEFAULT_IMAGE: &str = "/images/students/default-avatar.png";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
  Male,
  Female,
}

// ─── Student ─────────────────────────────────────────────────────────────────

/// A stored student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub student_id:  StudentId,
  /// Learner reference number.
  pub lrn:         String,
  /// Display form (`LAST, FIRST MIDDLE`), kept in step with the parts.
  pub name:        String,
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub gender:      Option<Gender>,
  pub birthday:    Option<NaiveDate>,
  pub address:     Option<String>,
  pub barangay_id: BarangayId,
  pub assessment:  String,
  pub image:       String,
  pub status:      StudentStatus,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Student {
  pub fn name_parts(&self) -> StudentName { name::resolve_parts(self) }

  pub fn display_name(&self) -> String { name::format(&self.name_parts()) }
}

impl NameSource for Student {
  fn last_name(&self) -> &str { &self.last_name }

  fn first_name(&self) -> &str { &self.first_name }

  fn middle_name(&self) -> &str { &self.middle_name }

  fn full_name(&self) -> &str { &self.name }
}

/// Order students the way the panel's table does: by barangay name, then by
/// display name within a barangay.
pub fn sort_for_table(students: &mut [Student], barangays: &[Barangay]) {
  let names: HashMap<BarangayId, String> = barangays
    .iter()
    .map(|b| (b.barangay_id, b.name.to_lowercase()))
    .collect();

  students.sort_by_cached_key(|s| {
    (
      names.get(&s.barangay_id).cloned().unwrap_or_default(),
      s.display_name().to_lowercase(),
    )
  });
}

// ─── Form ────────────────────────────────────────────────────────────────────

/// The add/edit form as submitted.
///
/// Either the structured name fields or the single `name` field may be used;
/// see [`name::resolve_parts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentForm {
  pub lrn:         String,
  pub name:        String,
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub gender:      Option<Gender>,
  pub birthday:    Option<NaiveDate>,
  pub address:     Option<String>,
  pub barangay_id: Option<BarangayId>,
  pub assessment:  Option<String>,
  pub image:       Option<String>,
}

impl NameSource for StudentForm {
  fn last_name(&self) -> &str { &self.last_name }

  fn first_name(&self) -> &str { &self.first_name }

  fn middle_name(&self) -> &str { &self.middle_name }

  fn full_name(&self) -> &str { &self.name }
}

impl StudentForm {
  /// Validate and normalise into storable fields.
  ///
  /// `today` bounds the birthday; `previous_image` is kept when the form
  /// leaves the image blank on edit.
  pub fn into_fields(
    self,
    today: NaiveDate,
    previous_image: Option<&str>,
  ) -> Result<StudentFields> {
    let errors = validate::student_form(&self, today);
    if !errors.is_empty() {
      return Err(crate::Error::Validation(errors));
    }

    let parts = name::resolve_parts(&self);
    let barangay_id = self
      .barangay_id
      .ok_or_else(|| crate::Error::Validation(vec![validate::FieldError::required("barangayId")]))?;

    let image = self
      .image
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty())
      .or_else(|| previous_image.map(str::to_owned))
      .unwrap_or_else(|| DEFAULT_IMAGE.to_owned());

    Ok(StudentFields {
      lrn: self.lrn.trim().to_owned(),
      name: name::format(&parts),
      last_name: parts.last_name,
      first_name: parts.first_name,
      middle_name: parts.middle_name,
      gender: self.gender,
      birthday: self.birthday,
      address: self
        .address
        .map(|a| a.trim().to_owned())
        .filter(|a| !a.is_empty()),
      barangay_id,
      assessment: self.assessment.unwrap_or_default().trim().to_owned(),
      image,
    })
  }
}

impl From<&Student> for StudentForm {
  fn from(s: &Student) -> Self {
    Self {
      lrn:         s.lrn.clone(),
      name:        s.name.clone(),
      last_name:   s.last_name.clone(),
      first_name:  s.first_name.clone(),
      middle_name: s.middle_name.clone(),
      gender:      s.gender,
      birthday:    s.birthday,
      address:     s.address.clone(),
      barangay_id: Some(s.barangay_id),
      assessment:  Some(s.assessment.clone()),
      image:       Some(s.image.clone()),
    }
  }
}

/// Validated, normalised field values written by add and edit.
///
/// Status is deliberately absent: edits never move a record between
/// statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFields {
  pub lrn:         String,
  pub name:        String,
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub gender:      Option<Gender>,
  pub birthday:    Option<NaiveDate>,
  pub address:     Option<String>,
  pub barangay_id: BarangayId,
  pub assessment:  String,
  pub image:       String,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  fn form() -> StudentForm {
    StudentForm {
      lrn: "123456789012".into(),
      last_name: "Dela Cruz".into(),
      first_name: "Juan".into(),
      middle_name: "Miguel".into(),
      barangay_id: Some(BarangayId::new()),
      ..Default::default()
    }
  }

  #[test]
  fn structured_form_becomes_display_name() {
    let fields = form().into_fields(today(), None).unwrap();
    assert_eq!(fields.name, "Dela Cruz, Juan Miguel");
    assert_eq!(fields.image, DEFAULT_IMAGE);
    assert_eq!(fields.assessment, "");
  }

  #[test]
  fn legacy_single_name_is_split() {
    let f = StudentForm {
      name: "Santos, Maria Clara".into(),
      last_name: String::new(),
      first_name: String::new(),
      middle_name: String::new(),
      ..form()
    };
    let fields = f.into_fields(today(), None).unwrap();
    assert_eq!(fields.last_name, "Santos");
    assert_eq!(fields.first_name, "Maria");
    assert_eq!(fields.middle_name, "Clara");
  }

  #[test]
  fn blank_image_keeps_previous_on_edit() {
    let f = StudentForm {
      image: Some("  ".into()),
      ..form()
    };
    let fields = f.into_fields(today(), Some("/images/students/x.png")).unwrap();
    assert_eq!(fields.image, "/images/students/x.png");
  }

  #[test]
  fn invalid_form_reports_validation_errors() {
    let f = StudentForm {
      lrn: "12ab".into(),
      ..form()
    };
    let Err(Error::Validation(errors)) = f.into_fields(today(), None) else {
      panic!("expected validation error");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "lrn");
  }

  #[test]
  fn form_deserialises_from_camel_case_with_defaults() {
    let f: StudentForm =
      serde_json::from_str(r#"{"lrn":"123456789012","firstName":"Jose","gender":"male"}"#)
        .unwrap();
    assert_eq!(f.first_name, "Jose");
    assert_eq!(f.gender, Some(Gender::Male));
    assert!(f.barangay_id.is_none());
  }
}
