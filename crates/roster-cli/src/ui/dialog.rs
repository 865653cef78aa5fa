//! Confirmation dialog overlay.

use ratatui::{
  Frame,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use roster_core::lifecycle::LifecycleAction;

/// Title and body for confirmation `step` of `action` on `count` records.
pub fn text(action: LifecycleAction, count: usize, step: u8) -> (&'static str, String) {
  let noun = if count == 1 { "student" } else { "students" };
  match (action, step) {
    (LifecycleAction::Archive, _) => (
      "Archive",
      format!("Move {count} {noun} to the archive? They can be retrieved later."),
    ),
    (LifecycleAction::Graduate, _) => (
      "Graduate",
      format!("Mark {count} {noun} as graduated?"),
    ),
    (LifecycleAction::Retrieve, _) => (
      "Retrieve",
      format!("Return {count} {noun} to the masterlist?"),
    ),
    (LifecycleAction::Remove, 1) => (
      "Remove",
      format!("Remove {count} {noun}?"),
    ),
    (LifecycleAction::Remove, _) => (
      "Remove permanently",
      format!("This deletes {count} {noun} for good and cannot be undone. Continue?"),
    ),
  }
}

pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)])
    .flex(Flex::Center)
    .areas(row);
  cell
}

pub fn draw(f: &mut Frame, action: LifecycleAction, count: usize, step: u8) {
  let (title, body) = text(action, count, step);
  let of = action.required_confirmations();
  let border = if action == LifecycleAction::Remove { Color::Red } else { Color::Yellow };

  let area = centered(f.area(), 56.min(f.area().width), 7.min(f.area().height));
  let block = Block::default()
    .title(format!(" {title} ({step}/{of}) "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border).add_modifier(Modifier::BOLD));
  let inner = block.inner(area);

  f.render_widget(Clear, area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new(vec![
      Line::from(body),
      Line::from(""),
      Line::from(Span::styled(
        "[y] confirm   [n] cancel",
        Style::default().fg(Color::DarkGray),
      )),
    ])
    .wrap(Wrap { trim: true }),
    inner,
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn removal_has_distinct_second_dialog() {
    let (first, _) = text(LifecycleAction::Remove, 2, 1);
    let (second, body) = text(LifecycleAction::Remove, 2, 2);
    assert_ne!(first, second);
    assert!(body.contains("cannot be undone"));
  }

  #[test]
  fn singular_noun_for_one_record() {
    let (_, body) = text(LifecycleAction::Graduate, 1, 1);
    assert_eq!(body, "Mark 1 student as graduated?");
  }
}
