//! Add/edit form state for a single student record.
//!
//! Text fields take typed characters; gender and barangay are choices cycled
//! with the arrow keys. Rules are checked locally before anything is sent, so
//! the form can flag every bad field at once.

use chrono::NaiveDate;
use roster_core::{
  BarangayId, StudentId,
  barangay::Barangay,
  student::{Gender, Student, StudentForm},
  validate::{self, FieldError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  LastName,
  FirstName,
  MiddleName,
  Lrn,
  Gender,
  Birthday,
  Address,
  Barangay,
  Assessment,
}

impl Field {
  pub const ALL: [Self; 9] = [
    Self::LastName,
    Self::FirstName,
    Self::MiddleName,
    Self::Lrn,
    Self::Gender,
    Self::Birthday,
    Self::Address,
    Self::Barangay,
    Self::Assessment,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Self::LastName => "Last name",
      Self::FirstName => "First name",
      Self::MiddleName => "Middle name",
      Self::Lrn => "LRN",
      Self::Gender => "Gender",
      Self::Birthday => "Birthday",
      Self::Address => "Address",
      Self::Barangay => "Barangay",
      Self::Assessment => "Assessment",
    }
  }

  /// Field name used in validation errors.
  pub fn key(self) -> &'static str {
    match self {
      Self::LastName => "lastName",
      Self::FirstName => "firstName",
      Self::MiddleName => "middleName",
      Self::Lrn => "lrn",
      Self::Gender => "gender",
      Self::Birthday => "birthday",
      Self::Address => "address",
      Self::Barangay => "barangayId",
      Self::Assessment => "assessment",
    }
  }

  pub fn is_choice(self) -> bool { matches!(self, Self::Gender | Self::Barangay) }
}

/// What saving the form does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  New,
  /// Edit of an existing record, with the ETag it was read at.
  Existing {
    student_id: StudentId,
    etag:       Option<String>,
  },
}

#[derive(Debug, Clone)]
pub struct Editor {
  pub target:      Target,
  pub focus:       usize,
  pub last_name:   String,
  pub first_name:  String,
  pub middle_name: String,
  pub lrn:         String,
  pub gender:      Option<Gender>,
  /// `YYYY-MM-DD`, or blank.
  pub birthday:    String,
  pub address:     String,
  pub barangay_id: Option<BarangayId>,
  pub assessment:  String,
  pub errors:      Vec<FieldError>,
}

impl Editor {
  /// An empty form, preset to `barangay_id` when a barangay tab is open.
  pub fn blank(barangay_id: Option<BarangayId>) -> Self {
    Self {
      target: Target::New,
      focus: 0,
      last_name: String::new(),
      first_name: String::new(),
      middle_name: String::new(),
      lrn: String::new(),
      gender: None,
      birthday: String::new(),
      address: String::new(),
      barangay_id,
      assessment: String::new(),
      errors: Vec::new(),
    }
  }

  pub fn for_student(student: &Student, etag: Option<String>) -> Self {
    let parts = student.name_parts();
    Self {
      target: Target::Existing {
        student_id: student.student_id,
        etag,
      },
      focus: 0,
      last_name: parts.last_name,
      first_name: parts.first_name,
      middle_name: parts.middle_name,
      lrn: student.lrn.clone(),
      gender: student.gender,
      birthday: student
        .birthday
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default(),
      address: student.address.clone().unwrap_or_default(),
      barangay_id: Some(student.barangay_id),
      assessment: student.assessment.clone(),
      errors: Vec::new(),
    }
  }

  pub fn focused(&self) -> Field { Field::ALL[self.focus] }

  pub fn next(&mut self) { self.focus = (self.focus + 1) % Field::ALL.len(); }

  pub fn prev(&mut self) {
    self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
  }

  fn text_mut(&mut self, field: Field) -> Option<&mut String> {
    match field {
      Field::LastName => Some(&mut self.last_name),
      Field::FirstName => Some(&mut self.first_name),
      Field::MiddleName => Some(&mut self.middle_name),
      Field::Lrn => Some(&mut self.lrn),
      Field::Birthday => Some(&mut self.birthday),
      Field::Address => Some(&mut self.address),
      Field::Assessment => Some(&mut self.assessment),
      Field::Gender | Field::Barangay => None,
    }
  }

  pub fn push(&mut self, c: char) {
    if let Some(text) = self.text_mut(self.focused()) {
      text.push(c);
    }
  }

  pub fn pop(&mut self) {
    if let Some(text) = self.text_mut(self.focused()) {
      text.pop();
    }
  }

  /// Step a choice field forwards (`+1`) or backwards (`-1`).
  pub fn cycle(&mut self, barangays: &[Barangay], step: isize) {
    match self.focused() {
      Field::Gender => {
        let options = [None, Some(Gender::Male), Some(Gender::Female)];
        let at = options.iter().position(|g| *g == self.gender).unwrap_or(0);
        self.gender = options[wrap(at, step, options.len())];
      }
      Field::Barangay if !barangays.is_empty() => {
        let at = self
          .barangay_id
          .and_then(|id| barangays.iter().position(|b| b.barangay_id == id));
        let next = match at {
          Some(at) => wrap(at, step, barangays.len()),
          None if step < 0 => barangays.len() - 1,
          None => 0,
        };
        self.barangay_id = Some(barangays[next].barangay_id);
      }
      _ => {}
    }
  }

  /// Display text for `field`.
  pub fn value(&self, field: Field, barangays: &[Barangay]) -> String {
    match field {
      Field::LastName => self.last_name.clone(),
      Field::FirstName => self.first_name.clone(),
      Field::MiddleName => self.middle_name.clone(),
      Field::Lrn => self.lrn.clone(),
      Field::Gender => self.gender.map(|g| g.to_string()).unwrap_or_default(),
      Field::Birthday => self.birthday.clone(),
      Field::Address => self.address.clone(),
      Field::Barangay => self
        .barangay_id
        .and_then(|id| barangays.iter().find(|b| b.barangay_id == id))
        .map(|b| b.name.clone())
        .unwrap_or_default(),
      Field::Assessment => self.assessment.clone(),
    }
  }

  pub fn error_for(&self, field: Field) -> Option<&str> {
    self
      .errors
      .iter()
      .find(|e| e.field == field.key())
      .map(|e| e.message.as_str())
  }

  /// Build the request body, or record why it cannot be sent.
  pub fn to_form(&mut self, today: NaiveDate) -> Option<StudentForm> {
    let mut errors = Vec::new();
    let birthday = match self.birthday.trim() {
      "" => None,
      s => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
          errors.push(FieldError::new("birthday", "Birthday must be YYYY-MM-DD"));
          None
        }
      },
    };

    let form = StudentForm {
      lrn: self.lrn.clone(),
      name: String::new(),
      last_name: self.last_name.clone(),
      first_name: self.first_name.clone(),
      middle_name: self.middle_name.clone(),
      gender: self.gender,
      birthday,
      address: Some(self.address.clone()),
      barangay_id: self.barangay_id,
      assessment: Some(self.assessment.clone()),
      image: None,
    };

    errors.extend(validate::student_form(&form, today));
    if errors.is_empty() {
      self.errors.clear();
      Some(form)
    } else {
      self.errors = errors;
      None
    }
  }
}

fn wrap(at: usize, step: isize, len: usize) -> usize {
  (at as isize + step).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  fn barangay(name: &str) -> Barangay {
    Barangay {
      barangay_id: BarangayId::new(),
      name:        name.into(),
      created_at:  Utc::now(),
    }
  }

  fn type_in(editor: &mut Editor, text: &str) {
    for c in text.chars() {
      editor.push(c);
    }
  }

  #[test]
  fn typed_form_becomes_request_body() {
    let b = barangay("Poblacion");
    let mut editor = Editor::blank(Some(b.barangay_id));
    type_in(&mut editor, "Rizal");
    editor.next();
    type_in(&mut editor, "Jose");
    editor.next();
    editor.next();
    type_in(&mut editor, "123456789012");
    editor.next();
    editor.cycle(&[b.clone()], 1);
    editor.next();
    type_in(&mut editor, "2010-06-19");

    let form = editor.to_form(today()).unwrap();
    assert_eq!(form.last_name, "Rizal");
    assert_eq!(form.first_name, "Jose");
    assert_eq!(form.gender, Some(Gender::Male));
    assert_eq!(form.birthday, NaiveDate::from_ymd_opt(2010, 6, 19));
    assert_eq!(form.barangay_id, Some(b.barangay_id));
    assert!(form.image.is_none());
  }

  #[test]
  fn invalid_fields_are_flagged_together() {
    let mut editor = Editor::blank(None);
    editor.birthday = "19/06/2010".into();
    assert!(editor.to_form(today()).is_none());
    assert_eq!(
      editor.error_for(Field::Birthday),
      Some("Birthday must be YYYY-MM-DD")
    );
    assert_eq!(editor.error_for(Field::LastName), Some("Last name is required"));
    assert!(editor.error_for(Field::Barangay).is_some());
    assert!(editor.error_for(Field::Address).is_none());
  }

  #[test]
  fn choice_fields_ignore_typing_and_cycle() {
    let (a, b) = (barangay("Poblacion"), barangay("San Roque"));
    let list = [a.clone(), b.clone()];
    let mut editor = Editor::blank(None);
    editor.focus = Field::ALL.iter().position(|f| *f == Field::Barangay).unwrap();

    editor.push('x');
    assert_eq!(editor.value(Field::Barangay, &list), "");
    editor.cycle(&list, -1);
    assert_eq!(editor.barangay_id, Some(b.barangay_id));
    editor.cycle(&list, 1);
    assert_eq!(editor.barangay_id, Some(a.barangay_id));
  }

  #[test]
  fn edit_starts_from_the_record() {
    let b = barangay("Poblacion");
    let student = Student {
      student_id:  StudentId::new(),
      lrn:         "123456789012".into(),
      name:        "Dela Cruz, Juan Miguel".into(),
      last_name:   String::new(),
      first_name:  String::new(),
      middle_name: String::new(),
      gender:      Some(Gender::Male),
      birthday:    NaiveDate::from_ymd_opt(2011, 2, 3),
      address:     None,
      barangay_id: b.barangay_id,
      assessment:  String::new(),
      image:       roster_core::student::DEFAULT_IMAGE.into(),
      status:      roster_core::lifecycle::StudentStatus::Inactive,
      created_at:  Utc::now(),
      updated_at:  Utc::now(),
    };
    let editor = Editor::for_student(&student, Some("\"abc\"".into()));
    assert_eq!(editor.last_name, "Dela Cruz");
    assert_eq!(editor.middle_name, "Miguel");
    assert_eq!(editor.birthday, "2011-02-03");
    assert_eq!(editor.value(Field::Barangay, &[b]), "Poblacion");
    assert!(matches!(editor.target, Target::Existing { etag: Some(_), .. }));
  }

  #[test]
  fn focus_wraps_both_ways() {
    let mut editor = Editor::blank(None);
    editor.prev();
    assert_eq!(editor.focused(), Field::Assessment);
    editor.next();
    assert_eq!(editor.focused(), Field::LastName);
  }
}
