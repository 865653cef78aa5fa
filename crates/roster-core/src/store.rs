//! The `StudentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  BarangayId, StudentId,
  barangay::Barangay,
  lifecycle::StudentStatus,
  student::{Student, StudentFields},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`StudentStore::list_students`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
  pub status:      Option<StudentStatus>,
  pub barangay_id: Option<BarangayId>,
  /// Case-insensitive substring match over name and LRN.
  pub text:        Option<String>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a student record backend.
///
/// Status writes are conditional on the status the caller last read, so a
/// single record is never left half-transitioned and a concurrent change is
/// detected instead of overwritten.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait StudentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Barangays ─────────────────────────────────────────────────────────

  fn add_barangay(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Barangay, Self::Error>> + Send + '_;

  fn get_barangay(
    &self,
    id: BarangayId,
  ) -> impl Future<Output = Result<Option<Barangay>, Self::Error>> + Send + '_;

  /// All barangays, sorted by name.
  fn list_barangays(
    &self,
  ) -> impl Future<Output = Result<Vec<Barangay>, Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  /// Insert a new record with status `active`.
  fn add_student(
    &self,
    fields: StudentFields,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn list_students(
    &self,
    query: StudentQuery,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Overwrite the editable fields. Status is untouched. Returns `None` if the
  /// record does not exist.
  fn update_student(
    &self,
    id: StudentId,
    fields: StudentFields,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// The subset of `ids` that exist. Order is unspecified.
  fn find_many(
    &self,
    ids: Vec<StudentId>,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Set the status of `id` to `to` if it is currently `from`.
  ///
  /// Returns `false` when no row matched (gone, or status changed).
  fn update_status(
    &self,
    id: StudentId,
    from: StudentStatus,
    to: StudentStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Permanently delete `ids` whose status is `from`. Returns the number of
  /// rows deleted.
  fn delete_many(
    &self,
    ids: Vec<StudentId>,
    from: StudentStatus,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
