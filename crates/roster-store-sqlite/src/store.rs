//! [`SqliteStore`]: the SQLite implementation of [`StudentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use roster_core::{
  BarangayId, StudentId,
  barangay::Barangay,
  lifecycle::StudentStatus,
  store::{StudentQuery, StudentStore},
  student::{Student, StudentFields},
};

use crate::{
  Error, Result,
  encode::{
    RawBarangay, RawStudent, STUDENT_COLUMNS, encode_date, encode_dt, encode_gender,
    encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection handle is shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Owned column values for an insert or full update.
struct FieldParams {
  lrn:         String,
  name:        String,
  last_name:   String,
  first_name:  String,
  middle_name: String,
  gender:      Option<&'static str>,
  birthday:    Option<String>,
  address:     Option<String>,
  barangay_id: String,
  assessment:  String,
  image:       String,
}

impl From<StudentFields> for FieldParams {
  fn from(f: StudentFields) -> Self {
    Self {
      lrn:         f.lrn,
      name:        f.name,
      last_name:   f.last_name,
      first_name:  f.first_name,
      middle_name: f.middle_name,
      gender:      f.gender.map(encode_gender),
      birthday:    f.birthday.map(encode_date),
      address:     f.address,
      barangay_id: f.barangay_id.to_string(),
      assessment:  f.assessment,
      image:       f.image,
    }
  }
}

// ─── StudentStore impl ───────────────────────────────────────────────────────

impl StudentStore for SqliteStore {
  type Error = Error;

  // ── Barangays ─────────────────────────────────────────────────────────────

  async fn add_barangay(&self, name: String) -> Result<Barangay> {
    let barangay = Barangay {
      barangay_id: BarangayId::new(),
      name:        name.trim().to_owned(),
      created_at:  Utc::now(),
    };

    let id_str   = barangay.barangay_id.to_string();
    let name_str = barangay.name.clone();
    let at_str   = encode_dt(barangay.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO barangays (barangay_id, name, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(barangay)
  }

  async fn get_barangay(&self, id: BarangayId) -> Result<Option<Barangay>> {
    let id_str = id.to_string();

    let raw: Option<RawBarangay> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT barangay_id, name, created_at FROM barangays WHERE barangay_id = ?1",
              rusqlite::params![id_str],
              RawBarangay::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawBarangay::into_barangay).transpose()
  }

  async fn list_barangays(&self) -> Result<Vec<Barangay>> {
    let raws: Vec<RawBarangay> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT barangay_id, name, created_at FROM barangays
           ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt
          .query_map([], RawBarangay::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBarangay::into_barangay).collect()
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn add_student(&self, fields: StudentFields) -> Result<Student> {
    let now = Utc::now();
    let student = Student {
      student_id:  StudentId::new(),
      lrn:         fields.lrn.clone(),
      name:        fields.name.clone(),
      last_name:   fields.last_name.clone(),
      first_name:  fields.first_name.clone(),
      middle_name: fields.middle_name.clone(),
      gender:      fields.gender,
      birthday:    fields.birthday,
      address:     fields.address.clone(),
      barangay_id: fields.barangay_id,
      assessment:  fields.assessment.clone(),
      image:       fields.image.clone(),
      status:      StudentStatus::Active,
      created_at:  now,
      updated_at:  now,
    };

    let id_str     = student.student_id.to_string();
    let status_str = encode_status(student.status);
    let at_str     = encode_dt(now);
    let p          = FieldParams::from(fields);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO students (
             student_id, lrn, name, last_name, first_name, middle_name,
             gender, birthday, address, barangay_id, assessment, image,
             status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
          rusqlite::params![
            id_str,
            p.lrn,
            p.name,
            p.last_name,
            p.first_name,
            p.middle_name,
            p.gender,
            p.birthday,
            p.address,
            p.barangay_id,
            p.assessment,
            p.image,
            status_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(student)
  }

  async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    let id_str = id.to_string();

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STUDENT_COLUMNS} FROM students s WHERE s.student_id = ?1"),
              rusqlite::params![id_str],
              RawStudent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>> {
    let status_str   = query.status.map(encode_status);
    let barangay_str = query.barangay_id.map(|id| id.to_string());
    let text_pattern = query
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(|t| format!("%{t}%"));

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS}
           FROM students s
           LEFT JOIN barangays b ON b.barangay_id = s.barangay_id
           WHERE (?1 IS NULL OR s.status = ?1)
             AND (?2 IS NULL OR s.barangay_id = ?2)
             AND (?3 IS NULL OR s.name LIKE ?3 OR s.lrn LIKE ?3)
           ORDER BY b.name COLLATE NOCASE, s.name COLLATE NOCASE"
        ))?;

        let rows = stmt
          .query_map(
            rusqlite::params![status_str, barangay_str, text_pattern],
            RawStudent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  async fn update_student(
    &self,
    id: StudentId,
    fields: StudentFields,
  ) -> Result<Option<Student>> {
    let id_str = id.to_string();
    let at_str = encode_dt(Utc::now());
    let p      = FieldParams::from(fields);

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE students SET
             lrn = ?2, name = ?3, last_name = ?4, first_name = ?5, middle_name = ?6,
             gender = ?7, birthday = ?8, address = ?9, barangay_id = ?10,
             assessment = ?11, image = ?12, updated_at = ?13
           WHERE student_id = ?1",
          rusqlite::params![
            id_str,
            p.lrn,
            p.name,
            p.last_name,
            p.first_name,
            p.middle_name,
            p.gender,
            p.birthday,
            p.address,
            p.barangay_id,
            p.assessment,
            p.image,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        Ok(Some(conn.query_row(
          &format!("SELECT {STUDENT_COLUMNS} FROM students s WHERE s.student_id = ?1"),
          rusqlite::params![id_str],
          RawStudent::from_row,
        )?))
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn find_many(&self, ids: Vec<StudentId>) -> Result<Vec<Student>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let id_strs: Vec<String> = ids.iter().map(StudentId::to_string).collect();

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; id_strs.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS} FROM students s WHERE s.student_id IN ({placeholders})"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(id_strs.iter()),
            RawStudent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  async fn update_status(
    &self,
    id: StudentId,
    from: StudentStatus,
    to: StudentStatus,
  ) -> Result<bool> {
    let id_str   = id.to_string();
    let from_str = encode_status(from);
    let to_str   = encode_status(to);
    let at_str   = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE students SET status = ?3, updated_at = ?4
           WHERE student_id = ?1 AND status = ?2",
          rusqlite::params![id_str, from_str, to_str, at_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_many(&self, ids: Vec<StudentId>, from: StudentStatus) -> Result<u64> {
    let id_strs: Vec<String> = ids.iter().map(StudentId::to_string).collect();
    let from_str = encode_status(from);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut deleted = 0u64;
        {
          let mut stmt =
            tx.prepare("DELETE FROM students WHERE student_id = ?1 AND status = ?2")?;
          for id in &id_strs {
            deleted += stmt.execute(rusqlite::params![id, from_str])? as u64;
          }
        }
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    Ok(deleted)
  }
}
