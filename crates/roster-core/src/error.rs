//! Error types for `roster-core`.

use thiserror::Error;

use crate::{
  BarangayId, StudentId,
  lifecycle::{LifecycleAction, StudentStatus},
  validate::FieldError,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("no students selected")]
  EmptySelection,

  #[error("invalid action: {0:?}")]
  InvalidAction(String),

  #[error("student not found: {0}")]
  NotFound(StudentId),

  #[error("cannot {action} student {student_id}: status is {from}")]
  InvalidTransition {
    student_id: StudentId,
    from:       StudentStatus,
    action:     LifecycleAction,
  },

  #[error("barangay not found: {0}")]
  BarangayNotFound(BarangayId),

  #[error("validation failed on {} field(s)", .0.len())]
  Validation(Vec<FieldError>),

  #[error("a confirmation is already in progress")]
  ConfirmationInProgress,

  #[error("nothing is awaiting confirmation")]
  NoPendingConfirmation,

  #[error("store failure: {0}")]
  StoreFailure(String),
}

impl Error {
  /// Wrap a backend error. The message is kept; the type is not.
  pub fn store(e: impl std::error::Error) -> Self { Self::StoreFailure(e.to_string()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
