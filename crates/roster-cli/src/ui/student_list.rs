//! Student table: left panel.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::app::App;

/// Render the student table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_students();
  let selected = app.flow.selected().len();

  let mut title = format!(" {} ({}) ", app.mode.title(), visible.len());
  if selected > 0 {
    title = format!("{title}· {selected} selected ");
  }

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if app.filter_active || !app.filter.is_empty() && inner.height > 2 {
    let filter_area = Rect {
      y: inner.y + inner.height.saturating_sub(1),
      height: 1,
      ..inner
    };
    inner.height = inner.height.saturating_sub(1);

    let text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let rows: Vec<Row> = visible
    .iter()
    .map(|s| {
      let check = if app.flow.is_selected(s.student_id) { "[x]" } else { "[ ]" };
      Row::new(vec![
        Cell::from(check),
        Cell::from(s.name.clone()),
        Cell::from(s.lrn.clone()),
        Cell::from(app.barangay_name(s.barangay_id).to_owned()),
      ])
    })
    .collect();

  let header = Row::new(vec!["", "Name", "LRN", "Barangay"]).style(
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let mut state = TableState::default();
  state.select((!visible.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    Table::new(
      rows,
      [
        Constraint::Length(3),
        Constraint::Percentage(45),
        Constraint::Length(12),
        Constraint::Fill(1),
      ],
    )
    .header(header)
    .column_spacing(1)
    .row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}
