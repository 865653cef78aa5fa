//! Confirmation workflow for lifecycle actions.
//!
//! ```text
//! Idle ─select─▶ Selecting ─begin─▶ Confirming(1) ─confirm─▶ [Confirming(2)] ─confirm─▶ Committing ─finish─▶ Idle
//!                    ▲                    │                        │
//!                    └──────cancel────────┴────────────────────────┘
//! ```
//!
//! The id set is captured when the flow enters `Confirming` and never re-read
//! from the live selection afterwards, so a selection that changes while a
//! dialog is open cannot alter what gets committed. Removal needs two
//! confirmations; every other action needs one.

use crate::{
  Error, Result, StudentId,
  lifecycle::{BatchRequest, LifecycleAction, RemovalTicket, Selection},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Selecting,
  Confirming { step: u8 },
  Committing,
}

/// The result of advancing the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  /// Show confirmation dialog `step` of `of`.
  NeedsConfirmation { step: u8, of: u8 },
  /// All confirmations collected; execute this.
  Commit(Commit),
}

/// A fully-confirmed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
  Transition(BatchRequest),
  Removal(RemovalTicket),
}

#[derive(Debug, Clone)]
struct Pending {
  action:   LifecycleAction,
  captured: Selection,
}

/// Selection and confirmation state for one list view.
#[derive(Debug, Clone)]
pub struct ConfirmFlow {
  phase:   Phase,
  live:    Vec<StudentId>,
  pending: Option<Pending>,
}

impl Default for ConfirmFlow {
  fn default() -> Self { Self::new() }
}

impl ConfirmFlow {
  pub fn new() -> Self {
    Self {
      phase:   Phase::Idle,
      live:    Vec::new(),
      pending: None,
    }
  }

  pub fn phase(&self) -> Phase { self.phase }

  /// The current live selection, in selection order.
  pub fn selected(&self) -> &[StudentId] { &self.live }

  pub fn is_selected(&self, id: StudentId) -> bool { self.live.contains(&id) }

  /// The action awaiting confirmation and its captured ids.
  pub fn pending(&self) -> Option<(LifecycleAction, &[StudentId])> {
    self
      .pending
      .as_ref()
      .map(|p| (p.action, p.captured.ids()))
  }

  // ── Live selection ────────────────────────────────────────────────────────

  pub fn toggle(&mut self, id: StudentId) {
    if let Some(pos) = self.live.iter().position(|s| *s == id) {
      self.live.remove(pos);
    } else {
      self.live.push(id);
    }
    self.sync_idle_phase();
  }

  /// Replace the live selection.
  pub fn select_all(&mut self, ids: impl IntoIterator<Item = StudentId>) {
    self.live = Selection::batch(ids).ids().to_vec();
    self.sync_idle_phase();
  }

  pub fn clear_selection(&mut self) {
    self.live.clear();
    self.sync_idle_phase();
  }

  /// Live selection changes only move between Idle and Selecting; a pending
  /// confirmation keeps its phase.
  fn sync_idle_phase(&mut self) {
    if matches!(self.phase, Phase::Idle | Phase::Selecting) {
      self.phase = if self.live.is_empty() {
        Phase::Idle
      } else {
        Phase::Selecting
      };
    }
  }

  // ── Confirmation ──────────────────────────────────────────────────────────

  /// Start confirming `action` on `selection`, capturing its ids.
  pub fn begin(&mut self, action: LifecycleAction, selection: Selection) -> Result<Step> {
    if matches!(self.phase, Phase::Confirming { .. } | Phase::Committing) {
      return Err(Error::ConfirmationInProgress);
    }
    let captured = match selection {
      Selection::Single(id) => Selection::Single(id),
      Selection::Batch(ids) => Selection::batch(ids),
    };
    if captured.is_empty() {
      return Err(Error::EmptySelection);
    }

    self.pending = Some(Pending { action, captured });
    self.phase = Phase::Confirming { step: 1 };
    Ok(Step::NeedsConfirmation {
      step: 1,
      of:   action.required_confirmations(),
    })
  }

  /// Start confirming `action` on the live selection, or on `focused` when
  /// nothing is selected.
  pub fn begin_on_selection(
    &mut self,
    action: LifecycleAction,
    focused: Option<StudentId>,
  ) -> Result<Step> {
    let selection = match (self.live.as_slice(), focused) {
      ([], Some(id)) => Selection::Single(id),
      ([], None) => return Err(Error::EmptySelection),
      ([only], _) => Selection::Single(*only),
      (many, _) => Selection::batch(many.iter().copied()),
    };
    self.begin(action, selection)
  }

  /// Accept the current confirmation dialog.
  pub fn confirm(&mut self) -> Result<Step> {
    let Phase::Confirming { step } = self.phase else {
      return Err(Error::NoPendingConfirmation);
    };
    let pending = self.pending.as_ref().ok_or(Error::NoPendingConfirmation)?;
    let required = pending.action.required_confirmations();

    if step < required {
      self.phase = Phase::Confirming { step: step + 1 };
      return Ok(Step::NeedsConfirmation {
        step: step + 1,
        of:   required,
      });
    }

    let commit = match pending.action {
      LifecycleAction::Remove => {
        Commit::Removal(RemovalTicket::captured(pending.captured.ids().to_vec()))
      }
      action => Commit::Transition(BatchRequest::new(pending.captured.clone(), action)?),
    };
    self.phase = Phase::Committing;
    Ok(Step::Commit(commit))
  }

  /// Abandon the pending confirmation. The live selection is kept.
  pub fn cancel(&mut self) {
    self.pending = None;
    self.phase = Phase::Idle;
    self.sync_idle_phase();
  }

  /// Return to idle after a commit was executed, dropping the committed ids
  /// from the live selection.
  pub fn finish(&mut self) {
    if let Some(p) = self.pending.take() {
      let done = p.captured.ids();
      self.live.retain(|id| !done.contains(id));
    }
    self.phase = Phase::Idle;
    self.sync_idle_phase();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(n: usize) -> Vec<StudentId> { (0..n).map(|_| StudentId::new()).collect() }

  #[test]
  fn selection_moves_between_idle_and_selecting() {
    let mut flow = ConfirmFlow::new();
    let id = StudentId::new();
    assert_eq!(flow.phase(), Phase::Idle);
    flow.toggle(id);
    assert_eq!(flow.phase(), Phase::Selecting);
    flow.toggle(id);
    assert_eq!(flow.phase(), Phase::Idle);
  }

  #[test]
  fn archive_needs_one_confirmation() {
    let mut flow = ConfirmFlow::new();
    let batch = ids(2);
    flow.select_all(batch.clone());

    let step = flow
      .begin_on_selection(LifecycleAction::Archive, None)
      .unwrap();
    assert_eq!(step, Step::NeedsConfirmation { step: 1, of: 1 });

    let Step::Commit(Commit::Transition(req)) = flow.confirm().unwrap() else {
      panic!("expected commit");
    };
    assert_eq!(req.ids(), batch.as_slice());
    assert_eq!(req.action(), LifecycleAction::Archive);
    assert_eq!(flow.phase(), Phase::Committing);

    flow.finish();
    assert_eq!(flow.phase(), Phase::Idle);
    assert!(flow.selected().is_empty());
  }

  #[test]
  fn removal_needs_two_confirmations() {
    let mut flow = ConfirmFlow::new();
    let id = StudentId::new();

    flow
      .begin(LifecycleAction::Remove, Selection::Single(id))
      .unwrap();
    assert_eq!(
      flow.confirm().unwrap(),
      Step::NeedsConfirmation { step: 2, of: 2 }
    );
    assert_eq!(flow.phase(), Phase::Confirming { step: 2 });

    let Step::Commit(Commit::Removal(ticket)) = flow.confirm().unwrap() else {
      panic!("expected removal");
    };
    assert_eq!(ticket.ids(), &[id]);
  }

  #[test]
  fn removal_uses_ids_captured_at_first_confirmation() {
    let mut flow = ConfirmFlow::new();
    let batch = ids(3);
    flow.select_all(batch[..2].iter().copied());
    flow
      .begin_on_selection(LifecycleAction::Remove, None)
      .unwrap();

    // Selection changes while the dialog is open.
    flow.toggle(batch[0]);
    flow.toggle(batch[2]);
    flow.confirm().unwrap();
    flow.select_all(batch.clone());

    let Step::Commit(Commit::Removal(ticket)) = flow.confirm().unwrap() else {
      panic!("expected removal");
    };
    assert_eq!(ticket.ids(), &batch[..2]);
  }

  #[test]
  fn confirm_without_begin_is_an_error() {
    let mut flow = ConfirmFlow::new();
    assert!(matches!(flow.confirm(), Err(Error::NoPendingConfirmation)));
  }

  #[test]
  fn cancel_between_removal_steps_deletes_nothing() {
    let mut flow = ConfirmFlow::new();
    let batch = ids(2);
    flow.select_all(batch.clone());
    flow
      .begin_on_selection(LifecycleAction::Remove, None)
      .unwrap();
    flow.confirm().unwrap();
    flow.cancel();

    assert_eq!(flow.phase(), Phase::Selecting);
    assert_eq!(flow.selected(), batch.as_slice());
    assert!(flow.pending().is_none());
    assert!(matches!(flow.confirm(), Err(Error::NoPendingConfirmation)));
  }

  #[test]
  fn cannot_begin_twice() {
    let mut flow = ConfirmFlow::new();
    let id = StudentId::new();
    flow
      .begin(LifecycleAction::Graduate, Selection::Single(id))
      .unwrap();
    assert!(matches!(
      flow.begin(LifecycleAction::Archive, Selection::Single(id)),
      Err(Error::ConfirmationInProgress)
    ));
  }

  #[test]
  fn empty_selection_cannot_begin() {
    let mut flow = ConfirmFlow::new();
    assert!(matches!(
      flow.begin_on_selection(LifecycleAction::Archive, None),
      Err(Error::EmptySelection)
    ));
    assert!(matches!(
      flow.begin(LifecycleAction::Archive, Selection::Batch(vec![])),
      Err(Error::EmptySelection)
    ));
  }

  #[test]
  fn focused_row_is_used_when_nothing_is_selected() {
    let mut flow = ConfirmFlow::new();
    let id = StudentId::new();
    flow
      .begin_on_selection(LifecycleAction::Graduate, Some(id))
      .unwrap();
    assert_eq!(flow.pending(), Some((LifecycleAction::Graduate, &[id][..])));
  }
}
