//! Student name normalisation.
//!
//! Names arrive in two shapes: structured `last/first/middle` fields, or a
//! single free-text field from older records. Everything here is total and
//! side-effect free; malformed input maps to (possibly empty) parts.
//!
//! The two free-text forms are read differently on purpose:
//!
//! - `"Dela Cruz, Juan Miguel"`: the segment before the first comma is the
//!   last name, then first name, then middle name(s).
//! - `"Juan Miguel Rizal"`: first token is the first name, the *last* token
//!   is the last name, and anything in between is the middle name.

use serde::{Deserialize, Serialize};

/// The structured parts of a student's name. Any part may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentName {
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
}

impl StudentName {
  pub fn new(
    last_name: impl Into<String>,
    first_name: impl Into<String>,
    middle_name: impl Into<String>,
  ) -> Self {
    Self {
      last_name:   last_name.into(),
      first_name:  first_name.into(),
      middle_name: middle_name.into(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.last_name.is_empty()
      && self.first_name.is_empty()
      && self.middle_name.is_empty()
  }

  /// Copy of `self` with every part trimmed.
  pub fn trimmed(&self) -> Self {
    Self::new(
      self.last_name.trim(),
      self.first_name.trim(),
      self.middle_name.trim(),
    )
  }
}

/// Anything that carries name fields: a stored record, an incoming form.
pub trait NameSource {
  fn last_name(&self) -> &str;
  fn first_name(&self) -> &str;
  fn middle_name(&self) -> &str;
  /// The single free-text name field.
  fn full_name(&self) -> &str;
}

// ─── Parse ───────────────────────────────────────────────────────────────────

/// Split a free-text name into parts.
pub fn parse(full_name: &str) -> StudentName {
  let value = full_name.trim();
  if value.is_empty() {
    return StudentName::default();
  }

  if let Some((last, rest)) = value.split_once(',') {
    // Later commas are treated as whitespace.
    let mut tokens = rest
      .split(|c: char| c == ',' || c.is_whitespace())
      .filter(|t| !t.is_empty());
    let first = tokens.next().unwrap_or_default();
    let middle = tokens.collect::<Vec<_>>().join(" ");
    return StudentName::new(last.trim(), first, middle);
  }

  let tokens: Vec<&str> = value.split_whitespace().collect();
  match tokens.as_slice() {
    [] => StudentName::default(),
    [only] => StudentName::new(*only, "", ""),
    [first, middle @ .., last] => {
      StudentName::new(*last, *first, middle.join(" "))
    }
  }
}

// ─── Format ──────────────────────────────────────────────────────────────────

/// Canonical display form: `LAST, FIRST MIDDLE`.
///
/// The comma appears only when both last and first are present.
pub fn format(parts: &StudentName) -> String {
  let StudentName {
    last_name,
    first_name,
    middle_name,
  } = parts.trimmed();

  let base = [last_name, first_name]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(", ");

  match (base.is_empty(), middle_name.is_empty()) {
    (_, true) => base,
    (true, false) => middle_name,
    (false, false) => format!("{base} {middle_name}"),
  }
}

/// Display form of a raw free-text name.
pub fn format_full(full_name: &str) -> String { format(&parse(full_name)) }

/// Map a display name back to `FIRST MIDDLE LAST`, skipping empty parts.
pub fn unformat(display_name: &str) -> String {
  let parts = parse(display_name);
  [parts.first_name, parts.middle_name, parts.last_name]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

// ─── Resolve ─────────────────────────────────────────────────────────────────

/// The name parts of a record.
///
/// Structured fields win when any of them is non-blank; otherwise the single
/// `name` field is parsed.
pub fn resolve_parts(record: &impl NameSource) -> StudentName {
  let fields = StudentName::new(
    record.last_name(),
    record.first_name(),
    record.middle_name(),
  )
  .trimmed();

  if !fields.is_empty() {
    return fields;
  }
  parse(record.full_name())
}
