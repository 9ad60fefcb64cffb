//! Shared scaffolding for the resource list views: one sync engine, one
//! selection coordinator and one search filter, glued together so every
//! view gets identical filtering, paging, hover and reset behavior.

use crate::scope::Scope;
use crate::select::{RowKey, SelectionCoordinator};
use crate::sync::ResourceSync;
use crate::ui::components::{KeyResult, SearchInput};
use crate::ui::renderfns::truncate;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// Fixed page sizes 'p' steps through; past the last one the size snaps
/// back to fitting the viewport.
const PAGE_SIZES: [usize; 3] = [10, 25, 50];

/// A filtered, paginated resource list backed by a sync engine.
///
/// The filter predicate is the pair (scope, search text); whenever it
/// changes the selection is reset outright. A data refresh under the same
/// predicate instead reconciles the selection against row identity.
pub struct ResourceList<T> {
  sync: ResourceSync<T>,
  select: SelectionCoordinator,
  search: SearchInput,
  scope: Scope,
  matcher: fn(&T, &str) -> bool,
  visible: Vec<T>,
  applied_sig: String,
  rows_area: Option<Rect>,
  page_size_override: Option<usize>,
}

impl<T> ResourceList<T>
where
  T: RowKey + Clone + Serialize + DeserializeOwned + Send + 'static,
{
  /// `matcher` decides whether a row matches a lowercased search needle.
  pub fn new(sync: ResourceSync<T>, scope: Scope, matcher: fn(&T, &str) -> bool) -> Self {
    let mut list = Self {
      sync,
      select: SelectionCoordinator::new(20),
      search: SearchInput::new(),
      scope,
      matcher,
      visible: Vec::new(),
      applied_sig: String::new(),
      rows_area: None,
      page_size_override: None,
    };
    list.applied_sig = list.signature();
    list
  }

  /// Rows after filtering; all selection indices point into this list.
  pub fn rows(&self) -> &[T] {
    &self.visible
  }

  pub fn selected(&self) -> Option<&T> {
    self.select.selected(&self.visible)
  }

  pub fn select_index(&mut self, index: usize) {
    self.select.select(index, &self.visible);
  }

  pub fn hovered_index(&self) -> Option<usize> {
    self.select.hovered_index()
  }

  pub fn sync_mut(&mut self) -> &mut ResourceSync<T> {
    &mut self.sync
  }

  pub fn search_active(&self) -> bool {
    self.search.is_active()
  }

  /// Pump fetches and keep the derived row list and selection in step with
  /// the data and the filter predicate. Returns true when rows changed.
  pub fn tick(&mut self) -> bool {
    let data_changed = self.sync.tick(Instant::now());
    let sig = self.signature();
    let filter_changed = sig != self.applied_sig;
    if !data_changed && !filter_changed {
      return false;
    }

    self.rebuild_visible();
    if filter_changed {
      self.applied_sig = sig;
      self.select.reset_for_new_items(self.visible.len());
    } else {
      self.select.reconcile(&self.visible);
    }
    true
  }

  /// Returns true if the key was consumed.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    match self.search.handle_key(key) {
      KeyResult::Handled => return true,
      KeyResult::Event(_) => {
        self.apply_filter();
        return true;
      }
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        self.select.move_down(&self.visible);
        true
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.select.move_up(&self.visible);
        true
      }
      KeyCode::PageDown | KeyCode::Char(']') => {
        self.select.next_page(self.visible.len());
        true
      }
      KeyCode::PageUp | KeyCode::Char('[') => {
        self.select.prev_page(self.visible.len());
        true
      }
      KeyCode::Char('r') => {
        self.sync.refetch();
        true
      }
      KeyCode::Char('p') => {
        self.cycle_page_size();
        true
      }
      KeyCode::Esc if self.select.global_index().is_some() => {
        self.select.clear();
        true
      }
      _ => false,
    }
  }

  /// Hover follows the pointer; a left click selects the row under it.
  pub fn handle_mouse(&mut self, mouse: MouseEvent) {
    let Some(area) = self.rows_area else {
      return;
    };
    let inside = mouse.column >= area.x
      && mouse.column < area.x + area.width
      && mouse.row >= area.y
      && mouse.row < area.y + area.height;
    if !inside {
      self.select.set_hovered(None);
      return;
    }

    let offset = (mouse.row - area.y) as usize;
    let (start, end) = self.select.page_bounds(self.visible.len());
    let global = start + offset;
    if global < end {
      self.select.set_hovered(Some(global));
      if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
        self.select.select(global, &self.visible);
      }
    } else {
      self.select.set_hovered(None);
    }
  }

  /// Render the bordered list. `row_fn` turns a row and its global index
  /// into a display line; the index lets callers style flash highlights.
  pub fn render<F>(
    &mut self,
    frame: &mut Frame,
    area: Rect,
    title: &str,
    header: Line<'static>,
    mut row_fn: F,
  ) where
    F: FnMut(&T, usize) -> Line<'static>,
  {
    let len = self.visible.len();
    let title = if self.sync.is_loading() {
      format!(" {} (loading...) ", title)
    } else if let Some(e) = self.sync.error() {
      format!(" {} (error: {}) ", title, truncate(e, 40))
    } else {
      format!(" {} ({}) ", title, len)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .title_bottom(
        Line::from(format!(
          " page {}/{} ",
          self.select.page(),
          self.select.total_pages(len)
        ))
        .right_aligned(),
      )
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if len == 0 {
      let content = if self.sync.is_loading() {
        "Loading..."
      } else if self.sync.error().is_some() {
        "Failed to load. Press 'r' to retry."
      } else if self.search.query().is_empty() {
        "No resources found."
      } else {
        "No resources match the filter."
      };
      let paragraph = Paragraph::new(content).style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      self.rows_area = None;
      self.search.render_overlay(frame, area);
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(1)])
      .split(inner);

    frame.render_widget(
      Paragraph::new(header).style(
        Style::default()
          .fg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      ),
      chunks[0],
    );

    let rows_area = chunks[1];
    // Page size tracks the viewport unless the user pinned one; the local
    // index re-derives from it either way
    let viewport = rows_area.height.max(1) as usize;
    self
      .select
      .set_page_size(self.page_size_override.unwrap_or(viewport), len);
    let (start, end) = self.select.page_bounds(len);
    let hovered = self.select.hovered_index();

    let items: Vec<ListItem> = self.visible[start..end]
      .iter()
      .enumerate()
      .map(|(i, row)| {
        let global = start + i;
        let mut item = ListItem::new(row_fn(row, global));
        if hovered == Some(global) {
          item = item.style(Style::default().add_modifier(Modifier::UNDERLINED));
        }
        item
      })
      .collect();

    let list = List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(self.select.local_index());
    frame.render_stateful_widget(list, rows_area, &mut state);

    self.rows_area = Some(rows_area);
    self.search.render_overlay(frame, area);
  }

  /// Step through the fixed page sizes and back to viewport-fit. The
  /// selection's global index is untouched; its local index re-derives
  /// against the new page geometry.
  fn cycle_page_size(&mut self) {
    self.page_size_override = match self.page_size_override {
      None => Some(PAGE_SIZES[0]),
      Some(current) => PAGE_SIZES
        .iter()
        .position(|&size| size == current)
        .and_then(|i| PAGE_SIZES.get(i + 1))
        .copied(),
    };
    if let Some(size) = self.page_size_override {
      self.select.set_page_size(size, self.visible.len());
    }
  }

  #[cfg(test)]
  fn selection(&self) -> &SelectionCoordinator {
    &self.select
  }

  fn signature(&self) -> String {
    format!(
      "{}|{}",
      self.scope.cache_key(),
      self.search.query().to_lowercase()
    )
  }

  fn apply_filter(&mut self) {
    let sig = self.signature();
    if sig != self.applied_sig {
      self.applied_sig = sig;
      self.rebuild_visible();
      self.select.reset_for_new_items(self.visible.len());
    }
  }

  fn rebuild_visible(&mut self) {
    let needle = self.search.query().to_lowercase();
    let matcher = self.matcher;
    self.visible = self
      .sync
      .rows()
      .iter()
      .filter(|row| needle.is_empty() || matcher(row, &needle))
      .cloned()
      .collect();
  }
}
