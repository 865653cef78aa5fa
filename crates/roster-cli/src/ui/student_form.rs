//! Add/edit form overlay.

use ratatui::{
  Frame,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};
use roster_core::barangay::Barangay;

use super::dialog::centered;
use crate::editor::{Editor, Field, Target};

pub fn draw(f: &mut Frame, editor: &Editor, barangays: &[Barangay]) {
  let title = match editor.target {
    Target::New => " New student ",
    Target::Existing { .. } => " Edit student ",
  };
  let height = (Field::ALL.len() + editor.errors.len()) as u16 + 2;
  let area = centered(f.area(), 64.min(f.area().width), height.min(f.area().height));

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
  let inner = block.inner(area);

  let mut lines = Vec::new();
  for (i, field) in Field::ALL.iter().enumerate() {
    let focused = i == editor.focus;
    let label_style = if focused {
      Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
      Style::default().fg(Color::Cyan)
    };
    let mut value = editor.value(*field, barangays);
    if focused && field.is_choice() {
      value = format!("‹ {value} ›");
    } else if focused {
      value.push('▏');
    }
    lines.push(Line::from(vec![
      Span::styled(format!("{:<12}", field.label()), label_style),
      Span::raw(" "),
      Span::raw(value),
    ]));
    if let Some(err) = editor.error_for(*field) {
      lines.push(Line::from(Span::styled(
        format!("{:13}{err}", ""),
        Style::default().fg(Color::Red),
      )));
    }
  }

  f.render_widget(Clear, area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(lines), inner);
}
