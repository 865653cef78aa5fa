//! Application state machine and event dispatcher.

use std::{path::PathBuf, sync::Arc};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use roster_core::{
  BarangayId, StudentId,
  barangay::{Barangay, sort_by_name},
  confirm::{Commit, ConfirmFlow, Phase, Step},
  lifecycle::{Completion, LifecycleAction, StudentStatus},
  student::{Student, sort_for_table},
};

use crate::{
  client::{ApiClient, BulkSummary},
  editor::{Editor, Target},
};

// ─── Mode ─────────────────────────────────────────────────────────────────────

/// Which status the table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Masterlist,
  Archive,
  Graduated,
}

impl Mode {
  pub const ALL: [Self; 3] = [Self::Masterlist, Self::Archive, Self::Graduated];

  pub fn status(self) -> StudentStatus {
    match self {
      Self::Masterlist => StudentStatus::Active,
      Self::Archive => StudentStatus::Inactive,
      Self::Graduated => StudentStatus::Graduated,
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::Masterlist => "Masterlist",
      Self::Archive => "Archive",
      Self::Graduated => "Graduated",
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub mode: Mode,

  /// Barangays, alphabetical. Tab 0 is "All"; tab `n` is `barangays[n - 1]`.
  pub barangays: Vec<Barangay>,
  pub barangay_tab: usize,

  /// Records of the current mode, in table order.
  pub students: Vec<Student>,

  /// Current fuzzy-filter string.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Cursor position within the visible list.
  pub list_cursor: usize,

  /// Checkbox selection and the confirmation dialogs.
  pub flow: ConfirmFlow,

  /// Open add/edit form, if any.
  pub editor: Option<Editor>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Directory CSV exports are written to.
  pub export_dir: PathBuf,

  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient, export_dir: PathBuf) -> Self {
    Self {
      mode: Mode::Masterlist,
      barangays: Vec::new(),
      barangay_tab: 0,
      students: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      flow: ConfirmFlow::new(),
      editor: None,
      status_msg: String::new(),
      export_dir,
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch barangays and the current mode's records.
  pub async fn load(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    let mut barangays = match self.client.list_barangays().await {
      Ok(b) => b,
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return Err(e);
      }
    };
    sort_by_name(&mut barangays);
    self.barangays = barangays;
    if self.barangay_tab > self.barangays.len() {
      self.barangay_tab = 0;
    }
    self.load_students().await
  }

  async fn load_students(&mut self) -> anyhow::Result<()> {
    match self.client.list_students(self.mode.status()).await {
      Ok(mut students) => {
        sort_for_table(&mut students, &self.barangays);
        self.students = students;
        self.clamp_cursor();
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  // ── Visible list ──────────────────────────────────────────────────────────

  pub fn current_barangay(&self) -> Option<&Barangay> {
    self
      .barangay_tab
      .checked_sub(1)
      .and_then(|i| self.barangays.get(i))
  }

  pub fn barangay_name(&self, id: BarangayId) -> &str {
    self
      .barangays
      .iter()
      .find(|b| b.barangay_id == id)
      .map(|b| b.name.as_str())
      .unwrap_or("—")
  }

  /// Records on the current barangay tab that match the filter.
  pub fn visible_students(&self) -> Vec<&Student> {
    let barangay = self.current_barangay().map(|b| b.barangay_id);
    let matcher = SkimMatcherV2::default();
    self
      .students
      .iter()
      .filter(|s| barangay.is_none_or(|id| s.barangay_id == id))
      .filter(|s| {
        self.filter.is_empty()
          || matcher.fuzzy_match(&s.name, &self.filter).is_some()
          || matcher.fuzzy_match(&s.lrn, &self.filter).is_some()
      })
      .collect()
  }

  pub fn cursor_student(&self) -> Option<&Student> {
    self.visible_students().get(self.list_cursor).copied()
  }

  fn clamp_cursor(&mut self) {
    let len = self.visible_students().len();
    self.list_cursor = self.list_cursor.min(len.saturating_sub(1));
  }

  /// Leave the current view: selection does not carry across tabs.
  fn reset_view(&mut self) {
    self.flow.clear_selection();
    self.list_cursor = 0;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if matches!(self.flow.phase(), Phase::Confirming { .. }) {
      self.handle_dialog_key(key).await;
      return Ok(true);
    }

    if self.editor.is_some() {
      self.handle_editor_key(key).await;
      return Ok(true);
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    self.handle_list_key(key).await
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_editor_key(&mut self, key: KeyEvent) {
    let Some(editor) = self.editor.as_mut() else {
      return;
    };
    match key.code {
      KeyCode::Esc => {
        self.editor = None;
        self.status_msg = "Cancelled".into();
      }
      KeyCode::Enter => self.save().await,
      KeyCode::Tab | KeyCode::Down => editor.next(),
      KeyCode::BackTab | KeyCode::Up => editor.prev(),
      KeyCode::Left => editor.cycle(&self.barangays, -1),
      KeyCode::Right => editor.cycle(&self.barangays, 1),
      KeyCode::Backspace => editor.pop(),
      KeyCode::Char(c) => editor.push(c),
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_students().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      // Barangay tabs
      KeyCode::Tab => {
        self.barangay_tab = (self.barangay_tab + 1) % (self.barangays.len() + 1);
        self.reset_view();
      }
      KeyCode::BackTab => {
        let n = self.barangays.len() + 1;
        self.barangay_tab = (self.barangay_tab + n - 1) % n;
        self.reset_view();
      }

      // Modes
      KeyCode::Char(c @ '1'..='3') => {
        let mode = Mode::ALL[(c as u8 - b'1') as usize];
        if mode != self.mode {
          self.mode = mode;
          self.reset_view();
          self.load_students().await.ok();
        }
      }

      // Selection
      KeyCode::Char(' ') => {
        if let Some(id) = self.cursor_student().map(|s| s.student_id) {
          self.flow.toggle(id);
        }
      }
      KeyCode::Char('a') => {
        let ids: Vec<StudentId> = self.visible_students().iter().map(|s| s.student_id).collect();
        if !ids.is_empty() && ids.iter().all(|id| self.flow.is_selected(*id)) {
          self.flow.clear_selection();
        } else {
          self.flow.select_all(ids);
        }
      }
      KeyCode::Esc => self.flow.clear_selection(),

      // Filter
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      // Lifecycle actions
      KeyCode::Char('x') => self.begin(LifecycleAction::Archive),
      KeyCode::Char('g') => self.begin(LifecycleAction::Graduate),
      KeyCode::Char('r') => self.begin(LifecycleAction::Retrieve),
      KeyCode::Char('d') => self.begin(LifecycleAction::Remove),

      // Records
      KeyCode::Char('n') => {
        self.editor = Some(Editor::blank(self.current_barangay().map(|b| b.barangay_id)));
      }
      KeyCode::Enter => self.open_editor().await,

      KeyCode::Char('e') => self.export().await,
      KeyCode::Char('R') => {
        self.load().await.ok();
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_dialog_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y') | KeyCode::Enter => match self.flow.confirm() {
        Ok(Step::NeedsConfirmation { .. }) => {}
        Ok(Step::Commit(commit)) => self.commit(commit).await,
        Err(e) => self.status_msg = format!("Error: {e}"),
      },
      KeyCode::Char('n') | KeyCode::Esc => {
        self.flow.cancel();
        self.status_msg = "Cancelled".into();
      }
      _ => {}
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  fn begin(&mut self, action: LifecycleAction) {
    if !self.mode.status().allows(action) {
      self.status_msg = format!("Cannot {action} from the {} view", self.mode.title());
      return;
    }
    let focused = self.cursor_student().map(|s| s.student_id);
    if let Err(e) = self.flow.begin_on_selection(action, focused) {
      self.status_msg = format!("Error: {e}");
    }
  }

  async fn commit(&mut self, commit: Commit) {
    let (action, ids) = match &commit {
      Commit::Transition(req) => (req.action(), req.ids().to_vec()),
      Commit::Removal(ticket) => (LifecycleAction::Remove, ticket.ids().to_vec()),
    };

    let msg = match self.client.bulk(action, &ids).await {
      Ok(summary) => summary_message(action, &summary),
      Err(e) => format!("Error: {e}"),
    };
    self.flow.finish();
    self.status_msg = match self.load_students().await {
      Ok(()) => msg,
      Err(e) => format!("{msg}; reload failed: {e}"),
    };
  }

  /// Open the record under the cursor, re-read so the save can carry its ETag.
  async fn open_editor(&mut self) {
    let Some(id) = self.cursor_student().map(|s| s.student_id) else {
      return;
    };
    match self.client.get_student(id).await {
      Ok((student, etag)) => self.editor = Some(Editor::for_student(&student, etag)),
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  async fn save(&mut self) {
    let Some(editor) = self.editor.as_mut() else {
      return;
    };
    let Some(form) = editor.to_form(chrono::Local::now().date_naive()) else {
      self.status_msg = format!("Fix {} field(s) before saving", editor.errors.len());
      return;
    };

    let saved = match &editor.target {
      Target::New => self.client.create_student(&form).await,
      Target::Existing { student_id, etag } => {
        self
          .client
          .update_student(*student_id, &form, etag.as_deref())
          .await
      }
    };
    let msg = match saved {
      Ok(student) => {
        self.editor = None;
        format!("Saved {}", student.display_name())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return;
      }
    };
    self.status_msg = match self.load_students().await {
      Ok(()) => msg,
      Err(e) => format!("{msg}; reload failed: {e}"),
    };
  }

  async fn export(&mut self) {
    let status = self.mode.status();
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = self
      .export_dir
      .join(format!("{}-{stamp}.csv", self.mode.title().to_lowercase()));

    self.status_msg = match self.client.export(status).await {
      Ok(bytes) => match std::fs::write(&path, bytes) {
        Ok(()) => format!("Exported to {}", path.display()),
        Err(e) => format!("Error writing {}: {e}", path.display()),
      },
      Err(e) => format!("Error: {e}"),
    };
  }
}

fn past_tense(action: LifecycleAction) -> &'static str {
  match action {
    LifecycleAction::Archive => "Archived",
    LifecycleAction::Graduate => "Graduated",
    LifecycleAction::Retrieve => "Retrieved",
    LifecycleAction::Remove => "Removed",
  }
}

/// Status-bar text for a finished batch.
pub fn summary_message(action: LifecycleAction, summary: &BulkSummary) -> String {
  let verb = past_tense(action);
  match summary.completion {
    Completion::Full => format!("{verb} {} student(s)", summary.applied()),
    Completion::Partial => format!(
      "{verb} {} of {} student(s); {} skipped",
      summary.applied(),
      summary.requested_count,
      summary.requested_count as u64 - summary.applied(),
    ),
    Completion::Failed => format!("No students {}", verb.to_lowercase()),
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use roster_core::student::DEFAULT_IMAGE;

  use super::*;
  use crate::client::ApiConfig;

  fn app() -> App {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
    })
    .unwrap();
    App::new(client, PathBuf::from("."))
  }

  fn barangay(name: &str) -> Barangay {
    Barangay {
      barangay_id: BarangayId::new(),
      name:        name.into(),
      created_at:  Utc::now(),
    }
  }

  fn student(name: &str, barangay: &Barangay) -> Student {
    Student {
      student_id:  StudentId::new(),
      lrn:         "123456789012".into(),
      name:        name.into(),
      last_name:   String::new(),
      first_name:  String::new(),
      middle_name: String::new(),
      gender:      None,
      birthday:    None,
      address:     None,
      barangay_id: barangay.barangay_id,
      assessment:  String::new(),
      image:       DEFAULT_IMAGE.into(),
      status:      StudentStatus::Active,
      created_at:  Utc::now(),
      updated_at:  Utc::now(),
    }
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn seeded() -> App {
    let mut app = app();
    let a = barangay("Poblacion");
    let b = barangay("San Roque");
    app.students = vec![
      student("Rizal, Jose", &a),
      student("Mabini, Apolinario", &b),
      student("Luna, Antonio", &b),
    ];
    app.barangays = vec![a, b];
    app
  }

  #[tokio::test]
  async fn new_record_form_opens_on_the_current_barangay() {
    let mut app = seeded();
    app.barangay_tab = 2;
    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    let editor = app.editor.as_ref().unwrap();
    assert_eq!(editor.target, Target::New);
    assert_eq!(editor.barangay_id, Some(app.barangays[1].barangay_id));

    // Typing goes into the form, not the list bindings.
    app.handle_key(key(KeyCode::Char('q'))).await.unwrap();
    assert_eq!(app.editor.as_ref().unwrap().last_name, "q");

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert!(app.editor.is_none());
  }

  #[tokio::test]
  async fn incomplete_form_is_not_sent() {
    let mut app = seeded();
    app.handle_key(key(KeyCode::Char('n'))).await.unwrap();
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    let editor = app.editor.as_ref().unwrap();
    assert!(!editor.errors.is_empty());
    assert!(app.status_msg.starts_with("Fix "), "{}", app.status_msg);
  }

  #[tokio::test]
  async fn reload_failure_is_shown_in_the_status_bar() {
    let mut app = seeded();
    assert!(app.handle_key(key(KeyCode::Char('R'))).await.unwrap());
    assert!(app.status_msg.starts_with("Error: "), "{}", app.status_msg);
    assert_eq!(app.students.len(), 3);
  }

  #[test]
  fn barangay_tab_limits_visible_records() {
    let mut app = seeded();
    assert_eq!(app.visible_students().len(), 3);
    app.barangay_tab = 2;
    let names: Vec<&str> = app.visible_students().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Mabini, Apolinario", "Luna, Antonio"]);
  }

  #[test]
  fn fuzzy_filter_matches_names() {
    let mut app = seeded();
    app.filter = "rizal".into();
    let visible = app.visible_students();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Rizal, Jose");
  }

  #[tokio::test]
  async fn archive_opens_a_single_dialog_for_the_selection() {
    let mut app = seeded();
    app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
    app.handle_key(key(KeyCode::Down)).await.unwrap();
    app.handle_key(key(KeyCode::Char(' '))).await.unwrap();
    assert_eq!(app.flow.selected().len(), 2);

    app.handle_key(key(KeyCode::Char('x'))).await.unwrap();
    assert_eq!(app.flow.phase(), Phase::Confirming { step: 1 });
    let (action, ids) = app.flow.pending().unwrap();
    assert_eq!(action, LifecycleAction::Archive);
    assert_eq!(ids.len(), 2);

    app.handle_key(key(KeyCode::Esc)).await.unwrap();
    assert!(app.flow.pending().is_none());
    assert_eq!(app.flow.selected().len(), 2);
  }

  #[tokio::test]
  async fn actions_outside_their_view_are_refused() {
    let mut app = seeded();
    app.handle_key(key(KeyCode::Char('d'))).await.unwrap();
    assert!(app.flow.pending().is_none());
    assert!(app.status_msg.contains("Cannot remove"));
  }

  #[test]
  fn partial_batch_message_counts_skipped_records() {
    let summary = BulkSummary {
      success:         true,
      modified_count:  Some(2),
      deleted_count:   None,
      requested_count: 3,
      completion:      Completion::Partial,
      results:         Vec::new(),
    };
    assert_eq!(
      summary_message(LifecycleAction::Archive, &summary),
      "Archived 2 of 3 student(s); 1 skipped"
    );
  }
}
