//! Field rules for the student form.
//!
//! Rules are checked together and every failure is reported, so a form can
//! show all of its problems at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{name, student::StudentForm};

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_ADDRESS_LEN: usize = 200;
pub const LRN_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &str, message: impl Into<String>) -> Self {
    Self {
      field:   field.to_owned(),
      message: message.into(),
    }
  }

  pub fn required(field: &str) -> Self {
    Self::new(field, format!("{} is required", label(field)))
  }
}

fn label(field: &str) -> &str {
  match field {
    "lastName" => "Last name",
    "firstName" => "First name",
    "middleName" => "Middle name",
    "lrn" => "LRN",
    "barangayId" => "Barangay",
    "birthday" => "Birthday",
    "address" => "Address",
    other => other,
  }
}

fn max_len(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
  if value.chars().count() > max {
    errors.push(FieldError::new(
      field,
      format!("{} must be less than {max} characters", label(field)),
    ));
  }
}

/// Check `form` against the student rules. Empty means valid.
pub fn student_form(form: &StudentForm, today: NaiveDate) -> Vec<FieldError> {
  let mut errors = Vec::new();
  let parts = name::resolve_parts(form);

  if parts.last_name.is_empty() {
    errors.push(FieldError::required("lastName"));
  }
  max_len(&mut errors, "lastName", &parts.last_name, MAX_NAME_LEN);

  if parts.first_name.is_empty() {
    errors.push(FieldError::required("firstName"));
  }
  max_len(&mut errors, "firstName", &parts.first_name, MAX_NAME_LEN);
  max_len(&mut errors, "middleName", &parts.middle_name, MAX_NAME_LEN);

  let lrn = form.lrn.trim();
  if lrn.is_empty() {
    errors.push(FieldError::required("lrn"));
  } else if lrn.len() != LRN_LEN || !lrn.bytes().all(|b| b.is_ascii_digit()) {
    errors.push(FieldError::new("lrn", format!("LRN must be exactly {LRN_LEN} digits")));
  }

  if form.barangay_id.is_none() {
    errors.push(FieldError::required("barangayId"));
  }

  if form.birthday.is_some_and(|b| b > today) {
    errors.push(FieldError::new("birthday", "Birthday cannot be in the future"));
  }

  if let Some(address) = &form.address {
    max_len(&mut errors, "address", address.trim(), MAX_ADDRESS_LEN);
  }

  errors
}
