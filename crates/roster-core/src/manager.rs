//! [`LifecycleManager`]: applies the transition table against a store.
//!
//! Single-record calls fail with a typed [`Error`]. Batches are best-effort:
//! each id is attempted on its own, failures are recorded in the
//! [`BatchReport`], and the report is returned only after every id was tried.

use std::collections::HashMap;

use chrono::Utc;

use crate::{
  Error, Result, StudentId,
  lifecycle::{
    BatchReport, BatchRequest, LifecycleAction, Outcome, RecordResult, RemovalTicket,
    StudentStatus,
  },
  store::StudentStore,
  student::{Student, StudentForm},
};

pub struct LifecycleManager<'a, S> {
  store: &'a S,
}

impl<'a, S> LifecycleManager<'a, S>
where
  S: StudentStore,
{
  pub fn new(store: &'a S) -> Self { Self { store } }

  // ── Records ───────────────────────────────────────────────────────────────

  /// Validate `form` and add it as a new `active` record.
  pub async fn add(&self, form: StudentForm) -> Result<Student> {
    let fields = form.into_fields(Utc::now().date_naive(), None)?;
    self.require_barangay(fields.barangay_id).await?;

    let student = self.store.add_student(fields).await.map_err(Error::store)?;
    tracing::info!(student_id = %student.student_id, "student added");
    Ok(student)
  }

  /// Replace the editable fields of `id`. Status never changes here.
  pub async fn edit(&self, id: StudentId, form: StudentForm) -> Result<Student> {
    let current = self.get(id).await?;
    let fields = form.into_fields(Utc::now().date_naive(), Some(&current.image))?;
    if fields.barangay_id != current.barangay_id {
      self.require_barangay(fields.barangay_id).await?;
    }

    let updated = self
      .store
      .update_student(id, fields)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))?;
    tracing::info!(student_id = %id, "student edited");
    Ok(updated)
  }

  pub async fn get(&self, id: StudentId) -> Result<Student> {
    self
      .store
      .get_student(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(id))
  }

  async fn require_barangay(&self, id: crate::BarangayId) -> Result<()> {
    self
      .store
      .get_barangay(id)
      .await
      .map_err(Error::store)?
      .map(|_| ())
      .ok_or(Error::BarangayNotFound(id))
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// Move one record along the transition table.
  ///
  /// Removal is refused here; use [`Self::remove`] with a ticket.
  pub async fn transition(&self, id: StudentId, action: LifecycleAction) -> Result<Student> {
    if action == LifecycleAction::Remove {
      return Err(Error::InvalidAction(
        "remove requires a confirmed removal ticket".into(),
      ));
    }

    let current = self.get(id).await?;
    let result = self.apply_one(id, current.status, action).await;
    if let Some(err) = result.into_error(id, action) {
      return Err(err);
    }
    self.get(id).await
  }

  /// Apply a status transition to every id in `request`, independently.
  pub async fn apply_batch(&self, request: BatchRequest) -> Result<BatchReport> {
    self.run(request.ids(), request.action()).await
  }

  /// Permanently delete the records captured in `ticket`.
  pub async fn remove(&self, ticket: RemovalTicket) -> Result<BatchReport> {
    self.run(ticket.ids(), LifecycleAction::Remove).await
  }

  async fn run(&self, ids: &[StudentId], action: LifecycleAction) -> Result<BatchReport> {
    if ids.is_empty() {
      return Err(Error::EmptySelection);
    }

    let statuses: HashMap<StudentId, StudentStatus> = self
      .store
      .find_many(ids.to_vec())
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|s| (s.student_id, s.status))
      .collect();

    let mut report = BatchReport::new(action, ids.len());
    for &id in ids {
      let result = match statuses.get(&id) {
        Some(&from) => self.apply_one(id, from, action).await,
        None => RecordResult::NotFound,
      };
      if !result.is_success() {
        tracing::warn!(student_id = %id, %action, ?result, "batch item not applied");
      }
      report.record(id, result);
    }

    tracing::info!(
      %action,
      requested = report.requested,
      modified = report.modified_count,
      deleted = report.deleted_count,
      completion = %report.completion(),
      "batch processed"
    );
    Ok(report)
  }

  /// Attempt `action` on one record last seen in status `from`.
  async fn apply_one(
    &self,
    id: StudentId,
    from: StudentStatus,
    action: LifecycleAction,
  ) -> RecordResult {
    let Some(outcome) = from.apply(action) else {
      return RecordResult::InvalidTransition { from };
    };

    let applied = match outcome {
      Outcome::Status(to) => self
        .store
        .update_status(id, from, to)
        .await
        .map(|hit| hit.then_some(RecordResult::Modified { status: to })),
      Outcome::Deleted => self
        .store
        .delete_many(vec![id], from)
        .await
        .map(|n| (n > 0).then_some(RecordResult::Deleted)),
    };

    match applied {
      Ok(Some(done)) => done,
      Ok(None) => self.explain_miss(id).await,
      Err(e) => RecordResult::StoreFailure {
        message: e.to_string(),
      },
    }
  }

  /// The conditional write matched nothing: the record vanished or its status
  /// moved since it was read.
  async fn explain_miss(&self, id: StudentId) -> RecordResult {
    match self.store.get_student(id).await {
      Ok(Some(s)) => RecordResult::InvalidTransition { from: s.status },
      Ok(None) => RecordResult::NotFound,
      Err(e) => RecordResult::StoreFailure {
        message: e.to_string(),
      },
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use std::{
    collections::HashSet,
    sync::Mutex,
  };

  use chrono::{NaiveDate, Utc};

  use super::*;
  use crate::{
    BarangayId,
    barangay::Barangay,
    lifecycle::{Completion, Selection},
    store::StudentQuery,
    student::{Gender, StudentFields},
  };

  // ── In-memory store ───────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("injected failure for {0}")]
  pub struct Injected(StudentId);

  #[derive(Default)]
  pub struct MemoryStore {
    barangays: Mutex<Vec<Barangay>>,
    students:  Mutex<HashMap<StudentId, Student>>,
    failing:   Mutex<HashSet<StudentId>>,
  }

  impl MemoryStore {
    fn fail_on(&self, id: StudentId) { self.failing.lock().unwrap().insert(id); }

    fn check(&self, id: StudentId) -> Result<(), Injected> {
      if self.failing.lock().unwrap().contains(&id) {
        return Err(Injected(id));
      }
      Ok(())
    }

    fn status_of(&self, id: StudentId) -> Option<StudentStatus> {
      self.students.lock().unwrap().get(&id).map(|s| s.status)
    }
  }

  impl StudentStore for MemoryStore {
    type Error = Injected;

    async fn add_barangay(&self, name: String) -> Result<Barangay, Injected> {
      let b = Barangay {
        barangay_id: BarangayId::new(),
        name,
        created_at: Utc::now(),
      };
      self.barangays.lock().unwrap().push(b.clone());
      Ok(b)
    }

    async fn get_barangay(&self, id: BarangayId) -> Result<Option<Barangay>, Injected> {
      let list = self.barangays.lock().unwrap();
      Ok(list.iter().find(|b| b.barangay_id == id).cloned())
    }

    async fn list_barangays(&self) -> Result<Vec<Barangay>, Injected> {
      Ok(self.barangays.lock().unwrap().clone())
    }

    async fn add_student(&self, f: StudentFields) -> Result<Student, Injected> {
      let now = Utc::now();
      let s = Student {
        student_id: StudentId::new(),
        lrn: f.lrn,
        name: f.name,
        last_name: f.last_name,
        first_name: f.first_name,
        middle_name: f.middle_name,
        gender: f.gender,
        birthday: f.birthday,
        address: f.address,
        barangay_id: f.barangay_id,
        assessment: f.assessment,
        image: f.image,
        status: StudentStatus::Active,
        created_at: now,
        updated_at: now,
      };
      self.students.lock().unwrap().insert(s.student_id, s.clone());
      Ok(s)
    }

    async fn get_student(&self, id: StudentId) -> Result<Option<Student>, Injected> {
      Ok(self.students.lock().unwrap().get(&id).cloned())
    }

    async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, Injected> {
      let all = self.students.lock().unwrap();
      Ok(
        all
          .values()
          .filter(|s| query.status.is_none_or(|st| s.status == st))
          .cloned()
          .collect(),
      )
    }

    async fn update_student(
      &self,
      id: StudentId,
      f: StudentFields,
    ) -> Result<Option<Student>, Injected> {
      let mut all = self.students.lock().unwrap();
      Ok(all.get_mut(&id).map(|s| {
        s.lrn = f.lrn;
        s.name = f.name;
        s.last_name = f.last_name;
        s.first_name = f.first_name;
        s.middle_name = f.middle_name;
        s.gender = f.gender;
        s.birthday = f.birthday;
        s.address = f.address;
        s.barangay_id = f.barangay_id;
        s.assessment = f.assessment;
        s.image = f.image;
        s.updated_at = Utc::now();
        s.clone()
      }))
    }

    async fn find_many(&self, ids: Vec<StudentId>) -> Result<Vec<Student>, Injected> {
      let all = self.students.lock().unwrap();
      Ok(ids.iter().filter_map(|id| all.get(id).cloned()).collect())
    }

    async fn update_status(
      &self,
      id: StudentId,
      from: StudentStatus,
      to: StudentStatus,
    ) -> Result<bool, Injected> {
      self.check(id)?;
      let mut all = self.students.lock().unwrap();
      match all.get_mut(&id) {
        Some(s) if s.status == from => {
          s.status = to;
          Ok(true)
        }
        _ => Ok(false),
      }
    }

    async fn delete_many(
      &self,
      ids: Vec<StudentId>,
      from: StudentStatus,
    ) -> Result<u64, Injected> {
      for id in &ids {
        self.check(*id)?;
      }
      let mut all = self.students.lock().unwrap();
      let mut n = 0;
      for id in ids {
        if all.get(&id).is_some_and(|s| s.status == from) {
          all.remove(&id);
          n += 1;
        }
      }
      Ok(n)
    }
  }

  pub fn form(barangay_id: BarangayId, last: &str, first: &str) -> StudentForm {
    StudentForm {
      lrn: "123456789012".into(),
      last_name: last.into(),
      first_name: first.into(),
      barangay_id: Some(barangay_id),
      ..Default::default()
    }
  }

  async fn seeded(n: usize) -> (MemoryStore, Vec<StudentId>) {
    let store = MemoryStore::default();
    let b = store.add_barangay("Poblacion".into()).await.unwrap();
    let mut ids = Vec::new();
    for i in 0..n {
      let s = LifecycleManager::new(&store)
        .add(form(b.barangay_id, "Rizal", &format!("Jose{i}")))
        .await
        .unwrap();
      ids.push(s.student_id);
    }
    (store, ids)
  }

  fn batch(ids: &[StudentId], action: LifecycleAction) -> BatchRequest {
    BatchRequest::new(Selection::batch(ids.iter().copied()), action).unwrap()
  }

  // ── Records ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_starts_active_with_display_name() {
    let (store, ids) = seeded(1).await;
    let s = LifecycleManager::new(&store).get(ids[0]).await.unwrap();
    assert_eq!(s.status, StudentStatus::Active);
    assert_eq!(s.name, "Rizal, Jose0");
  }

  #[tokio::test]
  async fn add_with_unknown_barangay_is_rejected() {
    let store = MemoryStore::default();
    let missing = BarangayId::new();
    let r = LifecycleManager::new(&store)
      .add(form(missing, "Rizal", "Jose"))
      .await;
    assert!(matches!(r, Err(Error::BarangayNotFound(id)) if id == missing));
  }

  #[tokio::test]
  async fn edit_keeps_status() {
    let (store, ids) = seeded(1).await;
    let mgr = LifecycleManager::new(&store);
    mgr
      .transition(ids[0], LifecycleAction::Archive)
      .await
      .unwrap();

    let current = mgr.get(ids[0]).await.unwrap();
    let edited = mgr
      .edit(ids[0], form(current.barangay_id, "Mabini", "Apolinario"))
      .await
      .unwrap();
    assert_eq!(edited.name, "Mabini, Apolinario");
    assert_eq!(edited.status, StudentStatus::Inactive);

    let mut again = StudentForm::from(&edited);
    again.address = Some("Tanauan, Batangas".into());
    let edited = mgr.edit(ids[0], again).await.unwrap();
    assert_eq!(edited.name, "Mabini, Apolinario");
    assert_eq!(edited.address.as_deref(), Some("Tanauan, Batangas"));
    assert_eq!(edited.status, StudentStatus::Inactive);
  }

  #[tokio::test]
  async fn edit_replaces_every_form_field() {
    let (store, ids) = seeded(1).await;
    let mgr = LifecycleManager::new(&store);
    let current = mgr.get(ids[0]).await.unwrap();

    let edited = mgr
      .edit(ids[0], StudentForm {
        lrn: "998877665544".into(),
        middle_name: "Protacio".into(),
        gender: Some(Gender::Male),
        birthday: NaiveDate::from_ymd_opt(2010, 6, 19),
        address: Some("Calamba, Laguna".into()),
        assessment: Some("Reads at grade level".into()),
        image: Some("/images/students/rizal.png".into()),
        ..form(current.barangay_id, "Rizal", "Jose")
      })
      .await
      .unwrap();

    let stored = mgr.get(ids[0]).await.unwrap();
    assert_eq!(stored, edited);
    assert_eq!(stored.lrn, "998877665544");
    assert_eq!(stored.name, "Rizal, Jose Protacio");
    assert_eq!(stored.gender, Some(Gender::Male));
    assert_eq!(stored.birthday, NaiveDate::from_ymd_opt(2010, 6, 19));
    assert_eq!(stored.address.as_deref(), Some("Calamba, Laguna"));
    assert_eq!(stored.assessment, "Reads at grade level");
    assert_eq!(stored.image, "/images/students/rizal.png");
    assert_eq!(stored.status, StudentStatus::Active);
  }

  // ── Single transitions ────────────────────────────────────────────────────

  #[tokio::test]
  async fn archive_then_retrieve() {
    let (store, ids) = seeded(1).await;
    let mgr = LifecycleManager::new(&store);

    let s = mgr
      .transition(ids[0], LifecycleAction::Archive)
      .await
      .unwrap();
    assert_eq!(s.status, StudentStatus::Inactive);

    let s = mgr
      .transition(ids[0], LifecycleAction::Retrieve)
      .await
      .unwrap();
    assert_eq!(s.status, StudentStatus::Active);
  }

  #[tokio::test]
  async fn graduate_from_inactive_is_rejected() {
    let (store, ids) = seeded(1).await;
    let mgr = LifecycleManager::new(&store);
    mgr
      .transition(ids[0], LifecycleAction::Archive)
      .await
      .unwrap();

    let r = mgr.transition(ids[0], LifecycleAction::Graduate).await;
    assert!(matches!(
      r,
      Err(Error::InvalidTransition {
        from: StudentStatus::Inactive,
        action: LifecycleAction::Graduate,
        ..
      })
    ));
    assert_eq!(store.status_of(ids[0]), Some(StudentStatus::Inactive));
  }

  #[tokio::test]
  async fn transition_unknown_id_is_not_found() {
    let store = MemoryStore::default();
    let id = StudentId::new();
    let r = LifecycleManager::new(&store)
      .transition(id, LifecycleAction::Archive)
      .await;
    assert!(matches!(r, Err(Error::NotFound(x)) if x == id));
  }

  #[tokio::test]
  async fn single_transition_refuses_removal() {
    let (store, ids) = seeded(1).await;
    let r = LifecycleManager::new(&store)
      .transition(ids[0], LifecycleAction::Remove)
      .await;
    assert!(matches!(r, Err(Error::InvalidAction(_))));
    assert!(store.status_of(ids[0]).is_some());
  }

  // ── Batches ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn batch_archive_reports_missing_ids_without_failing() {
    let (store, ids) = seeded(2).await;
    let missing = StudentId::new();

    let report = LifecycleManager::new(&store)
      .apply_batch(batch(&[ids[0], ids[1], missing], LifecycleAction::Archive))
      .await
      .unwrap();

    assert_eq!(report.requested, 3);
    assert_eq!(report.modified_count, 2);
    assert_eq!(report.outcome_for(missing), Some(&RecordResult::NotFound));
    assert_eq!(report.completion(), Completion::Partial);
    assert_eq!(store.status_of(ids[0]), Some(StudentStatus::Inactive));
    assert_eq!(store.status_of(ids[1]), Some(StudentStatus::Inactive));
  }

  #[tokio::test]
  async fn batch_graduate_skips_invalid_edges() {
    let (store, ids) = seeded(2).await;
    let mgr = LifecycleManager::new(&store);
    mgr
      .transition(ids[1], LifecycleAction::Archive)
      .await
      .unwrap();

    let report = mgr
      .apply_batch(batch(&ids, LifecycleAction::Graduate))
      .await
      .unwrap();
    assert_eq!(report.modified_count, 1);
    assert_eq!(
      report.outcome_for(ids[1]),
      Some(&RecordResult::InvalidTransition {
        from: StudentStatus::Inactive
      })
    );
    assert_eq!(store.status_of(ids[0]), Some(StudentStatus::Graduated));
    assert_eq!(store.status_of(ids[1]), Some(StudentStatus::Inactive));
  }

  #[tokio::test]
  async fn store_failure_on_one_id_does_not_stop_siblings() {
    let (store, ids) = seeded(3).await;
    store.fail_on(ids[1]);

    let report = LifecycleManager::new(&store)
      .apply_batch(batch(&ids, LifecycleAction::Archive))
      .await
      .unwrap();

    assert_eq!(report.modified_count, 2);
    assert!(matches!(
      report.outcome_for(ids[1]),
      Some(RecordResult::StoreFailure { .. })
    ));
    assert_eq!(store.status_of(ids[1]), Some(StudentStatus::Active));
    assert_eq!(store.status_of(ids[2]), Some(StudentStatus::Inactive));
    assert!(!report.all_store_failures());
  }

  #[tokio::test]
  async fn every_id_missing_is_a_failed_batch() {
    let store = MemoryStore::default();
    let report = LifecycleManager::new(&store)
      .apply_batch(batch(&[StudentId::new()], LifecycleAction::Retrieve))
      .await
      .unwrap();
    assert_eq!(report.completion(), Completion::Failed);
    assert_eq!(report.modified_count, 0);
    assert!(!report.all_store_failures());
  }

  #[tokio::test]
  async fn store_failure_on_every_id() {
    let (store, ids) = seeded(2).await;
    for id in &ids {
      store.fail_on(*id);
    }

    let report = LifecycleManager::new(&store)
      .apply_batch(batch(&ids, LifecycleAction::Graduate))
      .await
      .unwrap();

    assert!(report.all_store_failures());
    assert_eq!(report.completion(), Completion::Failed);
    assert_eq!(report.modified_count, 0);
    assert_eq!(store.status_of(ids[0]), Some(StudentStatus::Active));
  }

  // ── Removal ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn removal_only_deletes_non_active_records() {
    let (store, ids) = seeded(2).await;
    let mgr = LifecycleManager::new(&store);
    mgr
      .transition(ids[0], LifecycleAction::Archive)
      .await
      .unwrap();

    let ticket = RemovalTicket::pre_confirmed(ids.clone()).unwrap();
    let report = mgr.remove(ticket).await.unwrap();

    assert_eq!(report.deleted_count, 1);
    assert_eq!(report.outcome_for(ids[0]), Some(&RecordResult::Deleted));
    assert_eq!(
      report.outcome_for(ids[1]),
      Some(&RecordResult::InvalidTransition {
        from: StudentStatus::Active
      })
    );
    assert!(store.status_of(ids[0]).is_none());
    assert!(store.status_of(ids[1]).is_some());
  }

  #[tokio::test]
  async fn removal_through_confirm_flow_uses_captured_ids() {
    use crate::confirm::{Commit, ConfirmFlow, Step};

    let (store, ids) = seeded(3).await;
    let mgr = LifecycleManager::new(&store);
    for &id in &ids {
      mgr.transition(id, LifecycleAction::Graduate).await.unwrap();
    }

    let mut flow = ConfirmFlow::new();
    flow.select_all([ids[0]]);
    flow
      .begin_on_selection(LifecycleAction::Remove, None)
      .unwrap();
    flow.select_all(ids.clone());
    flow.confirm().unwrap();
    let Step::Commit(Commit::Removal(ticket)) = flow.confirm().unwrap() else {
      panic!("expected removal commit");
    };

    let report = mgr.remove(ticket).await.unwrap();
    assert_eq!(report.deleted_count, 1);
    assert!(store.status_of(ids[0]).is_none());
    assert_eq!(store.status_of(ids[1]), Some(StudentStatus::Graduated));
    assert_eq!(store.status_of(ids[2]), Some(StudentStatus::Graduated));
  }
}
