use crate::api::client::ApiClient;
use crate::api::types::Pod;
use crate::ui::renderfns::{phase_color, ready_color};
use crate::ui::view::{View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::mpsc;

const LOG_TAIL: u32 = 500;

/// Log panel for one pod. Also the landing view for deep links whose
/// target pod never appeared; those carry a synthetic record and the log
/// fetch simply reports its error.
pub struct LogsView {
  pod: Pod,
  api: ApiClient,
  logs: Option<String>,
  error: Option<String>,
  loading: bool,
  scroll: u16,
  rx: Option<mpsc::UnboundedReceiver<Result<String, String>>>,
}

impl LogsView {
  pub fn new(pod: Pod, api: ApiClient) -> Self {
    let mut view = Self {
      pod,
      api,
      logs: None,
      error: None,
      loading: false,
      scroll: 0,
      rx: None,
    };
    view.fetch();
    view
  }

  fn fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.rx = Some(rx);
    self.loading = true;
    self.error = None;

    let api = self.api.clone();
    let namespace = self.pod.namespace.clone();
    let name = self.pod.name.clone();
    tokio::spawn(async move {
      let result = api
        .get_pod_logs(&namespace, &name, LOG_TAIL)
        .await
        .map_err(|e| e.to_string());
      // Receiver dropped means the view is gone; nothing to do
      let _ = tx.send(result);
    });
  }
}

impl View for LogsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        self.scroll = self.scroll.saturating_add(1);
        ViewAction::None
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.scroll = self.scroll.saturating_sub(1);
        ViewAction::None
      }
      KeyCode::PageDown => {
        self.scroll = self.scroll.saturating_add(10);
        ViewAction::None
      }
      KeyCode::PageUp => {
        self.scroll = self.scroll.saturating_sub(10);
        ViewAction::None
      }
      KeyCode::Char('g') => {
        self.scroll = 0;
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.fetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::Unhandled,
    }
  }

  fn tick(&mut self) -> ViewAction {
    if let Some(rx) = &mut self.rx {
      if let Ok(result) = rx.try_recv() {
        self.loading = false;
        self.rx = None;
        match result {
          Ok(logs) => self.logs = Some(logs),
          Err(e) => self.error = Some(e),
        }
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.loading {
      format!(" Logs {}/{} (loading...) ", self.pod.namespace, self.pod.name)
    } else {
      format!(" Logs {}/{} ", self.pod.namespace, self.pod.name)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Pod header
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Log text
      ])
      .split(inner);

    let header = Line::from(vec![
      Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        self.pod.status.clone(),
        Style::default().fg(phase_color(&self.pod.status)),
      ),
      Span::raw("  "),
      Span::styled("Ready: ", Style::default().fg(Color::DarkGray)),
      Span::styled(
        self.pod.ready.clone(),
        Style::default().fg(ready_color(&self.pod.ready)),
      ),
      Span::raw("  "),
      Span::styled("Node: ", Style::default().fg(Color::DarkGray)),
      Span::raw(self.pod.node.clone()),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    if self.loading {
      let paragraph =
        Paragraph::new("Loading logs...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, chunks[2]);
      return;
    }

    if let Some(error) = &self.error {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, chunks[2]);
      return;
    }

    let text = self.logs.as_deref().unwrap_or("No log output.");
    let paragraph = Paragraph::new(text)
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(paragraph, chunks[2]);
  }

  fn breadcrumb_label(&self) -> String {
    format!("logs:{}", self.pod.name)
  }
}
