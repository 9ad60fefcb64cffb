//! Row selection over a paginated list that is periodically replaced
//! wholesale by the sync engine.
//!
//! Selection is tracked as a global index into the full filtered/sorted
//! list plus the identity key of the selected row. The page-local index is
//! always derived, never stored independently, so it cannot drift from the
//! global one. After every data refresh the caller reconciles: if the row
//! at the remembered index is gone or is now a different row, selection is
//! cleared rather than silently reattached to whatever moved into that
//! slot.

/// Identity seam for rows: stable across refetches for the same logical item.
pub trait RowKey {
  fn row_key(&self) -> String;
}

/// Selection, hover and pagination state for one list view.
#[derive(Debug, Clone)]
pub struct SelectionCoordinator {
  global: Option<usize>,
  selected_key: Option<String>,
  hovered: Option<usize>,
  page: usize, // 1-based
  page_size: usize,
}

impl SelectionCoordinator {
  pub fn new(page_size: usize) -> Self {
    Self {
      global: None,
      selected_key: None,
      hovered: None,
      page: 1,
      page_size: page_size.max(1),
    }
  }

  pub fn global_index(&self) -> Option<usize> {
    self.global
  }

  /// Index within the current page, defined iff the global index falls
  /// inside `[page_start, page_start + page_size)`.
  pub fn local_index(&self) -> Option<usize> {
    let global = self.global?;
    let start = (self.page - 1) * self.page_size;
    if global >= start && global < start + self.page_size {
      Some(global - start)
    } else {
      None
    }
  }

  pub fn hovered_index(&self) -> Option<usize> {
    self.hovered
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn total_pages(&self, len: usize) -> usize {
    len.div_ceil(self.page_size).max(1)
  }

  /// Rows of the current page: `[start, end)` bounds into the full list.
  pub fn page_bounds(&self, len: usize) -> (usize, usize) {
    let start = ((self.page - 1) * self.page_size).min(len);
    let end = (start + self.page_size).min(len);
    (start, end)
  }

  pub fn set_page(&mut self, page: usize, len: usize) {
    self.page = page.clamp(1, self.total_pages(len));
  }

  pub fn next_page(&mut self, len: usize) {
    self.set_page(self.page + 1, len);
  }

  pub fn prev_page(&mut self, len: usize) {
    self.set_page(self.page.saturating_sub(1), len);
  }

  pub fn set_page_size(&mut self, page_size: usize, len: usize) {
    self.page_size = page_size.max(1);
    // Keep the page in range; the local index re-derives on its own.
    self.page = self.page.clamp(1, self.total_pages(len));
  }

  pub fn set_hovered(&mut self, hovered: Option<usize>) {
    self.hovered = hovered;
  }

  /// Move selection down, following the selected row onto its page.
  pub fn move_down<R: RowKey>(&mut self, rows: &[R]) {
    if rows.is_empty() {
      return;
    }
    let next = match self.global {
      None => 0,
      Some(g) => (g + 1).min(rows.len() - 1),
    };
    self.select(next, rows);
  }

  /// Move selection up; from the top (or nothing) this clears selection.
  pub fn move_up<R: RowKey>(&mut self, rows: &[R]) {
    match self.global {
      None | Some(0) => self.clear(),
      Some(g) => self.select(g - 1, rows),
    }
  }

  /// Select a specific global index (deep links land here).
  pub fn select<R: RowKey>(&mut self, index: usize, rows: &[R]) {
    let Some(row) = rows.get(index) else {
      self.clear();
      return;
    };
    self.global = Some(index);
    self.selected_key = Some(row.row_key());
    self.follow_page();
  }

  /// The selected row, if the index still resolves to the remembered item.
  pub fn selected<'a, R: RowKey>(&self, rows: &'a [R]) -> Option<&'a R> {
    let global = self.global?;
    let row = rows.get(global)?;
    if self.selected_key.as_deref() == Some(row.row_key().as_str()) {
      Some(row)
    } else {
      None
    }
  }

  pub fn clear(&mut self) {
    self.global = None;
    self.selected_key = None;
    self.hovered = None;
  }

  /// Reset for a changed filter/sort predicate: the item set is different,
  /// so indices into it are meaningless. Unconditional.
  pub fn reset_for_new_items(&mut self, len: usize) {
    self.clear();
    self.page = self.page.clamp(1, self.total_pages(len));
  }

  /// Reconcile after a background refresh replaced the list. If the
  /// remembered index points past the end or at a different row, clear -
  /// never guess an alternate row.
  pub fn reconcile<R: RowKey>(&mut self, rows: &[R]) {
    if let Some(global) = self.global {
      let matches = rows
        .get(global)
        .is_some_and(|row| self.selected_key.as_deref() == Some(row.row_key().as_str()));
      if !matches {
        self.clear();
      }
    }
    if let Some(hovered) = self.hovered {
      if hovered >= rows.len() {
        self.hovered = None;
      }
    }
    self.page = self.page.clamp(1, self.total_pages(rows.len()));
  }

  /// Snap the current page to the one containing the selection.
  fn follow_page(&mut self) {
    if let Some(global) = self.global {
      self.page = global / self.page_size + 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rows(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("row-{i}")).collect()
  }

  impl RowKey for String {
    fn row_key(&self) -> String {
      self.clone()
    }
  }

  #[test]
  fn test_down_from_nothing_selects_first_row() {
    let rows = rows(25);
    let mut sel = SelectionCoordinator::new(10);
    sel.set_page(3, rows.len());

    sel.move_down(&rows);
    assert_eq!(sel.global_index(), Some(0));
    // Page snapped back to the one containing index 0
    assert_eq!(sel.page(), 1);
    assert_eq!(sel.local_index(), Some(0));
  }

  #[test]
  fn test_down_follows_selection_across_pages() {
    let rows = rows(25);
    let mut sel = SelectionCoordinator::new(10);

    for _ in 0..11 {
      sel.move_down(&rows);
    }
    assert_eq!(sel.global_index(), Some(10));
    assert_eq!(sel.page(), 2);
    assert_eq!(sel.local_index(), Some(0));
  }

  #[test]
  fn test_down_clamps_at_last_row() {
    let rows = rows(3);
    let mut sel = SelectionCoordinator::new(10);
    for _ in 0..10 {
      sel.move_down(&rows);
    }
    assert_eq!(sel.global_index(), Some(2));
  }

  #[test]
  fn test_up_from_top_clears() {
    let rows = rows(5);
    let mut sel = SelectionCoordinator::new(10);

    sel.move_up(&rows);
    assert_eq!(sel.global_index(), None);

    sel.move_down(&rows);
    sel.move_up(&rows);
    assert_eq!(sel.global_index(), None);
    assert_eq!(sel.local_index(), None);
  }

  #[test]
  fn test_local_index_partition() {
    // For every global index, local is defined iff it is on the current page.
    let rows = rows(25);
    let mut sel = SelectionCoordinator::new(10);

    for global in 0..rows.len() {
      sel.select(global, &rows);
      // follow_page puts us on the right page, so local must be defined
      let local = sel.local_index().expect("selection is on its page");
      assert!(local < sel.page_size());
      assert_eq!((sel.page() - 1) * sel.page_size() + local, global);

      // Paging away undefines local but keeps global
      let other = if sel.page() == 1 { 2 } else { 1 };
      sel.set_page(other, rows.len());
      assert_eq!(sel.local_index(), None);
      assert_eq!(sel.global_index(), Some(global));
    }
  }

  #[test]
  fn test_filter_change_resets_unconditionally() {
    let rows = rows(25);
    let mut sel = SelectionCoordinator::new(10);
    sel.select(14, &rows);
    sel.set_hovered(Some(3));

    sel.reset_for_new_items(7);
    assert_eq!(sel.global_index(), None);
    assert_eq!(sel.local_index(), None);
    assert_eq!(sel.hovered_index(), None);
    assert_eq!(sel.page(), 1);
  }

  #[test]
  fn test_reconcile_clears_when_row_vanishes() {
    let before = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let mut sel = SelectionCoordinator::new(10);
    sel.select(1, &before); // "b"

    // b removed, d appended: index 1 now holds a different row
    let after = vec!["a".to_string(), "c".to_string(), "d".to_string()];
    sel.reconcile(&after);
    assert_eq!(sel.global_index(), None);
  }

  #[test]
  fn test_reconcile_keeps_stable_selection() {
    let before = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let mut sel = SelectionCoordinator::new(10);
    sel.select(1, &before);

    // Same row at the same index: selection survives
    let after = vec!["x".to_string(), "b".to_string(), "c".to_string()];
    sel.reconcile(&after);
    assert_eq!(sel.global_index(), Some(1));
    assert_eq!(sel.selected(&after).map(|r| r.as_str()), Some("b"));
  }

  #[test]
  fn test_reconcile_clears_out_of_range_index() {
    let before = rows(10);
    let mut sel = SelectionCoordinator::new(10);
    sel.select(9, &before);

    let after = rows(4);
    sel.reconcile(&after);
    assert_eq!(sel.global_index(), None);
  }

  #[test]
  fn test_selected_guards_identity() {
    let rows_now = vec!["a".to_string(), "b".to_string()];
    let mut sel = SelectionCoordinator::new(10);
    sel.select(0, &rows_now);

    // Without reconciliation, selected() itself refuses a swapped row
    let swapped = vec!["z".to_string(), "b".to_string()];
    assert!(sel.selected(&swapped).is_none());
  }

  #[test]
  fn test_page_bounds_and_total_pages() {
    let mut sel = SelectionCoordinator::new(10);
    assert_eq!(sel.total_pages(0), 1);
    assert_eq!(sel.total_pages(10), 1);
    assert_eq!(sel.total_pages(11), 2);

    sel.set_page(2, 25);
    assert_eq!(sel.page_bounds(25), (10, 20));
    sel.set_page(3, 25);
    assert_eq!(sel.page_bounds(25), (20, 25));

    // Clamped: page 9 of a 25-row list is page 3
    sel.set_page(9, 25);
    assert_eq!(sel.page(), 3);
  }

  #[test]
  fn test_page_size_change_rederives_local() {
    let rows = rows(30);
    let mut sel = SelectionCoordinator::new(10);
    sel.select(12, &rows);
    assert_eq!(sel.page(), 2);
    assert_eq!(sel.local_index(), Some(2));

    sel.set_page_size(25, rows.len());
    // Page 2 of 25 covers [25, 30): index 12 is off-page now
    assert_eq!(sel.local_index(), None);
    assert_eq!(sel.global_index(), Some(12));
  }

  #[test]
  fn test_hover_is_cleared_when_past_end() {
    let mut sel = SelectionCoordinator::new(10);
    sel.set_hovered(Some(7));
    sel.reconcile(&rows(5));
    assert_eq!(sel.hovered_index(), None);

    sel.set_hovered(Some(2));
    sel.reconcile(&rows(5));
    assert_eq!(sel.hovered_index(), Some(2));
  }
}
