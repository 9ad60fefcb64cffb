pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::{App, Mode};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[0]);
  }

  draw_status_bar(frame, chunks[1], app);

  if *app.mode() == Mode::Command {
    draw_command_overlay(frame, chunks[0], app);
  }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      let hint = format!(
        " {} │ :command  /filter  j/k:nav  Enter:select  q:back  Ctrl-C:quit",
        app.location()
      );
      (hint, Style::default().fg(Color::DarkGray))
    }
    Mode::Command => {
      let cmd = format!(":{}", app.command_input());
      (cmd, Style::default().fg(Color::Yellow))
    }
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}

fn draw_command_overlay(frame: &mut Frame, area: Rect, app: &App) {
  let suggestions = app.autocomplete_suggestions();

  let width = (area.width * 50 / 100).clamp(34, 60);
  let height = (suggestions.len() as u16 + 3).min(area.height);
  let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height);

  frame.render_widget(Clear, overlay_area);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(" Command ");

  let inner = block.inner(overlay_area);
  frame.render_widget(block, overlay_area);

  if inner.height == 0 {
    return;
  }

  let mut lines = vec![Line::from(vec![
    Span::styled(":", Style::default().fg(Color::Yellow)),
    Span::raw(app.command_input().to_string()),
    Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
  ])];

  for (i, cmd) in suggestions.iter().enumerate() {
    let style = if i == app.selected_suggestion() {
      Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    lines.push(Line::from(vec![
      Span::styled(format!("  {:<14}", cmd.name), style),
      Span::styled(cmd.description.to_string(), style.fg(Color::DarkGray)),
    ]));
  }

  frame.render_widget(Paragraph::new(lines), inner);
}
