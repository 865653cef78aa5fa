//! Student detail pane: right panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use roster_core::{lifecycle::LifecycleAction, student::Student};

use crate::app::App;

/// Render the record under the cursor into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(student) = app.cursor_student() else {
    let block = Block::default()
      .title(" Detail ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No students in this view.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", student.display_name()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let para = Paragraph::new(lines(student, app.barangay_name(student.barangay_id)))
    .wrap(Wrap { trim: false });
  f.render_widget(para, inner);
}

/// Key hints for the actions the record's status permits.
fn actions(s: &Student) -> String {
  s.status
    .available_actions()
    .into_iter()
    .map(|a| match a {
      LifecycleAction::Archive => "x archive",
      LifecycleAction::Graduate => "g graduate",
      LifecycleAction::Retrieve => "r retrieve",
      LifecycleAction::Remove => "d delete",
    })
    .collect::<Vec<_>>()
    .join("  ")
}

fn lines(s: &Student, barangay: &str) -> Vec<Line<'static>> {
  let parts = s.name_parts();
  let gender = s.gender.map(|g| g.to_string()).unwrap_or_default();
  let birthday = s
    .birthday
    .map(|d| d.format("%B %-d, %Y").to_string())
    .unwrap_or_default();

  let fields: Vec<(&str, String)> = vec![
    ("LRN", s.lrn.clone()),
    ("Last name", parts.last_name),
    ("First name", parts.first_name),
    ("Middle name", parts.middle_name),
    ("Gender", gender),
    ("Birthday", birthday),
    ("Barangay", barangay.to_owned()),
    ("Address", s.address.clone().unwrap_or_default()),
    ("Status", s.status.to_string()),
    ("Assessment", s.assessment.clone()),
    ("Actions", actions(s)),
  ];

  fields
    .into_iter()
    .map(|(label, value)| {
      let value = if value.is_empty() { "—".to_owned() } else { value };
      Line::from(vec![
        Span::styled(
          format!("{label:<14}"),
          Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
      ])
    })
    .collect()
}
