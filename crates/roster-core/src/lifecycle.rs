//! Record status, the transition table, and batch request/report types.
//!
//! A student is always in exactly one of three statuses. Deletion is an
//! action that ends the record, not a fourth status. The only way between
//! `inactive` and `graduated` is back through `active`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result, StudentId};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StudentStatus {
  /// On the masterlist.
  Active,
  /// Archived (dropped out or otherwise removed from the masterlist).
  Inactive,
  Graduated,
}

impl StudentStatus {
  /// Apply `action` to a record in this status.
  ///
  /// Returns `None` when the transition table has no such edge.
  pub fn apply(self, action: LifecycleAction) -> Option<Outcome> {
    use LifecycleAction as A;
    use StudentStatus as S;

    match (self, action) {
      (S::Active, A::Archive) => Some(Outcome::Status(S::Inactive)),
      (S::Active, A::Graduate) => Some(Outcome::Status(S::Graduated)),
      (S::Inactive | S::Graduated, A::Retrieve) => Some(Outcome::Status(S::Active)),
      (S::Inactive | S::Graduated, A::Remove) => Some(Outcome::Deleted),
      _ => None,
    }
  }

  pub fn allows(self, action: LifecycleAction) -> bool { self.apply(action).is_some() }

  /// Actions the table permits from this status.
  pub fn available_actions(self) -> Vec<LifecycleAction> {
    LifecycleAction::ALL
      .into_iter()
      .filter(|a| self.allows(*a))
      .collect()
  }
}

/// What a permitted transition does to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Status(StudentStatus),
  Deleted,
}

// ─── Actions ─────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleAction {
  Archive,
  Graduate,
  Retrieve,
  /// Permanent removal. Needs a [`RemovalTicket`].
  Remove,
}

impl LifecycleAction {
  pub const ALL: [Self; 4] = [Self::Archive, Self::Graduate, Self::Retrieve, Self::Remove];

  /// Number of explicit confirmations the panel must collect first.
  pub fn required_confirmations(self) -> u8 {
    match self {
      Self::Remove => 2,
      _ => 1,
    }
  }
}

/// The action vocabulary of the bulk endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BulkAction {
  Archive,
  Delete,
  Retrieve,
}

impl BulkAction {
  /// Parse the wire string, mapping anything unknown to
  /// [`Error::InvalidAction`].
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::InvalidAction(s.to_owned()))
  }
}

impl From<BulkAction> for LifecycleAction {
  fn from(a: BulkAction) -> Self {
    match a {
      BulkAction::Archive => Self::Archive,
      BulkAction::Delete => Self::Remove,
      BulkAction::Retrieve => Self::Retrieve,
    }
  }
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Which records a request targets.
///
/// Callers say whether they mean one record or many; it is never inferred from
/// whatever happens to be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
  Single(StudentId),
  Batch(Vec<StudentId>),
}

impl Selection {
  /// A batch selection, deduplicated in first-seen order.
  pub fn batch(ids: impl IntoIterator<Item = StudentId>) -> Self {
    Self::Batch(dedup(ids))
  }

  pub fn ids(&self) -> &[StudentId] {
    match self {
      Self::Single(id) => std::slice::from_ref(id),
      Self::Batch(ids) => ids,
    }
  }

  pub fn is_empty(&self) -> bool { self.ids().is_empty() }

  pub fn len(&self) -> usize { self.ids().len() }
}

/// A status transition applied independently to each id.
///
/// Removal is not expressible here; it needs a [`RemovalTicket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
  ids:    Vec<StudentId>,
  action: LifecycleAction,
}

impl BatchRequest {
  pub fn new(selection: Selection, action: LifecycleAction) -> Result<Self> {
    if action == LifecycleAction::Remove {
      return Err(Error::InvalidAction(
        "remove requires a confirmed removal ticket".into(),
      ));
    }
    let ids = dedup(selection.ids().iter().copied());
    if ids.is_empty() {
      return Err(Error::EmptySelection);
    }
    Ok(Self { ids, action })
  }

  pub fn ids(&self) -> &[StudentId] { &self.ids }

  pub fn action(&self) -> LifecycleAction { self.action }
}

/// Proof that permanent removal of exactly these ids was confirmed.
///
/// The id set is fixed at construction; later selection changes cannot reach
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTicket {
  ids: Vec<StudentId>,
}

impl RemovalTicket {
  pub(crate) fn captured(ids: Vec<StudentId>) -> Self { Self { ids } }

  /// For machine callers (the bulk endpoint) whose client already collected
  /// both confirmations.
  pub fn pre_confirmed(ids: impl IntoIterator<Item = StudentId>) -> Result<Self> {
    let ids = dedup(ids);
    if ids.is_empty() {
      return Err(Error::EmptySelection);
    }
    Ok(Self { ids })
  }

  pub fn ids(&self) -> &[StudentId] { &self.ids }
}

fn dedup(ids: impl IntoIterator<Item = StudentId>) -> Vec<StudentId> {
  let mut seen = HashSet::new();
  ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

// ─── Reports ─────────────────────────────────────────────────────────────────

/// What happened to one id in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordResult {
  Modified { status: StudentStatus },
  Deleted,
  NotFound,
  InvalidTransition { from: StudentStatus },
  StoreFailure { message: String },
}

impl RecordResult {
  pub fn is_success(&self) -> bool { matches!(self, Self::Modified { .. } | Self::Deleted) }

  /// The equivalent single-record error, if this was a failure.
  pub fn into_error(self, student_id: StudentId, action: LifecycleAction) -> Option<Error> {
    match self {
      Self::Modified { .. } | Self::Deleted => None,
      Self::NotFound => Some(Error::NotFound(student_id)),
      Self::InvalidTransition { from } => Some(Error::InvalidTransition {
        student_id,
        from,
        action,
      }),
      Self::StoreFailure { message } => Some(Error::StoreFailure(message)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutcome {
  pub student_id: StudentId,
  #[serde(flatten)]
  pub result:     RecordResult,
}

/// How much of a batch went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Completion {
  Full,
  Partial,
  Failed,
}

/// Aggregate and per-id results of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
  pub action:         LifecycleAction,
  pub requested:      usize,
  pub modified_count: u64,
  pub deleted_count:  u64,
  pub outcomes:       Vec<RecordOutcome>,
}

impl BatchReport {
  pub(crate) fn new(action: LifecycleAction, requested: usize) -> Self {
    Self {
      action,
      requested,
      modified_count: 0,
      deleted_count: 0,
      outcomes: Vec::with_capacity(requested),
    }
  }

  pub(crate) fn record(&mut self, student_id: StudentId, result: RecordResult) {
    match result {
      RecordResult::Modified { .. } => self.modified_count += 1,
      RecordResult::Deleted => self.deleted_count += 1,
      _ => {}
    }
    self.outcomes.push(RecordOutcome { student_id, result });
  }

  pub fn succeeded(&self) -> usize {
    self.outcomes.iter().filter(|o| o.result.is_success()).count()
  }

  pub fn completion(&self) -> Completion {
    match self.succeeded() {
      0 => Completion::Failed,
      n if n == self.requested => Completion::Full,
      _ => Completion::Partial,
    }
  }

  /// True when every id failed in the backend rather than on a rule.
  pub fn all_store_failures(&self) -> bool {
    !self.outcomes.is_empty()
      && self
        .outcomes
        .iter()
        .all(|o| matches!(o.result, RecordResult::StoreFailure { .. }))
  }

  pub fn outcome_for(&self, id: StudentId) -> Option<&RecordResult> {
    self
      .outcomes
      .iter()
      .find(|o| o.student_id == id)
      .map(|o| &o.result)
  }
}
