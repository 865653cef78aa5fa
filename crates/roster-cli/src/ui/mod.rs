//! TUI rendering: orchestrates all panes.

pub mod dialog;
pub mod student_form;
pub mod student_detail;
pub mod student_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};
use roster_core::confirm::Phase;

use crate::app::{App, Mode};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // barangay tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_barangay_tabs(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);

  if let Some(editor) = &app.editor {
    student_form::draw(f, editor, &app.barangays);
  }

  if let Phase::Confirming { step } = app.flow.phase()
    && let Some((action, ids)) = app.flow.pending()
  {
    dialog::draw(f, action, ids.len(), step);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let mut spans = vec![Span::styled(
    " roster ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];
  for (i, mode) in Mode::ALL.iter().enumerate() {
    let style = if *mode == app.mode {
      Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} {} ", i + 1, mode.title()), style));
  }

  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));
  let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(used)
    .saturating_sub(right.content.len());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn draw_barangay_tabs(f: &mut Frame, area: Rect, app: &App) {
  let titles: Vec<String> = std::iter::once("All".to_owned())
    .chain(app.barangays.iter().map(|b| b.name.clone()))
    .collect();

  let tabs = Tabs::new(titles)
    .select(app.barangay_tab)
    .style(Style::default().fg(Color::DarkGray))
    .highlight_style(
      Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD),
    )
    .divider("│");
  f.render_widget(tabs, area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(area);

  student_list::draw(f, cols[0], app);
  student_detail::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let actions = match app.mode {
    Mode::Masterlist => "x archive  g graduate",
    Mode::Archive | Mode::Graduated => "r retrieve  d remove",
  };

  let (mode_label, hints) = if matches!(app.flow.phase(), Phase::Confirming { .. }) {
    ("CONFIRM", "y/Enter confirm  n/Esc cancel".to_owned())
  } else if app.editor.is_some() {
    (
      "EDIT",
      "Tab/↑↓ field  ←→ choose  Enter save  Esc cancel".to_owned(),
    )
  } else if app.filter_active {
    ("SEARCH", "Type to filter  Esc cancel  Enter done".to_owned())
  } else {
    (
      "NORMAL",
      format!("jk move  Space select  a all  Tab barangay  1-3 view  {actions}  n new  Enter edit  e export  / search  q quit"),
    )
  };

  let status = if app.status_msg.is_empty() {
    hints
  } else {
    app.status_msg.clone()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::Gray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
