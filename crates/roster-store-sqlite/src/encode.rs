//! Encoding and decoding helpers between roster domain types and the plain
//! text stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, birthdays `YYYY-MM-DD`, ids hyphenated
//! lowercase UUIDs. Enumerations use their lowercase wire names.

use chrono::{DateTime, NaiveDate, Utc};
use roster_core::{
  barangay::Barangay,
  lifecycle::StudentStatus,
  student::{Gender, Student},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn encode_status(s: StudentStatus) -> &'static str {
  match s {
    StudentStatus::Active => "active",
    StudentStatus::Inactive => "inactive",
    StudentStatus::Graduated => "graduated",
  }
}

pub fn decode_status(s: &str) -> Result<StudentStatus> {
  s.parse().map_err(|_| Error::Decode {
    column: "status",
    value:  s.to_owned(),
  })
}

pub fn encode_gender(g: Gender) -> &'static str {
  match g {
    Gender::Male => "male",
    Gender::Female => "female",
  }
}

pub fn decode_gender(s: &str) -> Result<Gender> {
  s.parse().map_err(|_| Error::Decode {
    column: "gender",
    value:  s.to_owned(),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawStudent::from_row`].
pub const STUDENT_COLUMNS: &str = "s.student_id, s.lrn, s.name, s.last_name, s.first_name, \
   s.middle_name, s.gender, s.birthday, s.address, s.barangay_id, s.assessment, s.image, \
   s.status, s.created_at, s.updated_at";

/// Raw strings read directly from a `students` row.
pub struct RawStudent {
  pub student_id:  String,
  pub lrn:         String,
  pub name:        String,
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub gender:      Option<String>,
  pub birthday:    Option<String>,
  pub address:     Option<String>,
  pub barangay_id: String,
  pub assessment:  String,
  pub image:       String,
  pub status:      String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:  row.get(0)?,
      lrn:         row.get(1)?,
      name:        row.get(2)?,
      last_name:   row.get(3)?,
      first_name:  row.get(4)?,
      middle_name: row.get(5)?,
      gender:      row.get(6)?,
      birthday:    row.get(7)?,
      address:     row.get(8)?,
      barangay_id: row.get(9)?,
      assessment:  row.get(10)?,
      image:       row.get(11)?,
      status:      row.get(12)?,
      created_at:  row.get(13)?,
      updated_at:  row.get(14)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id:  self.student_id.parse()?,
      lrn:         self.lrn,
      name:        self.name,
      last_name:   self.last_name,
      first_name:  self.first_name,
      middle_name: self.middle_name,
      gender:      self.gender.as_deref().map(decode_gender).transpose()?,
      birthday:    self.birthday.as_deref().map(decode_date).transpose()?,
      address:     self.address,
      barangay_id: self.barangay_id.parse()?,
      assessment:  self.assessment,
      image:       self.image,
      status:      decode_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `barangays` row.
pub struct RawBarangay {
  pub barangay_id: String,
  pub name:        String,
  pub created_at:  String,
}

impl RawBarangay {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      barangay_id: row.get(0)?,
      name:        row.get(1)?,
      created_at:  row.get(2)?,
    })
  }

  pub fn into_barangay(self) -> Result<Barangay> {
    Ok(Barangay {
      barangay_id: self.barangay_id.parse()?,
      name:        self.name,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
