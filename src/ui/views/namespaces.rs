use crate::api::types::Namespace;
use crate::app::AppContext;
use crate::sync::ResourceSync;
use crate::ui::renderfns::truncate;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::list::ResourceList;
use crate::ui::views::PodsView;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::prelude::*;

/// Namespace list. Enter scopes the session to the selected namespace and
/// jumps to pods; 'a' widens the scope back to all namespaces.
pub struct NamespacesView {
  ctx: AppContext,
  list: ResourceList<Namespace>,
}

impl NamespacesView {
  pub fn new(ctx: AppContext) -> Self {
    let api = ctx.api.clone();
    // Namespaces are cluster-scoped; the cache key ignores the selection
    let key_scope = ctx.scope.clone();
    let sync = ResourceSync::new(
      "namespaces",
      ctx.store.clone(),
      move || key_scope.cluster(),
      move || {
        let api = api.clone();
        async move { api.get_namespaces().await.map_err(|e| e.to_string()) }
      },
    )
    .with_options(ctx.sync);

    let list = ResourceList::new(sync, ctx.scope.clone(), |ns: &Namespace, needle| {
      ns.name.to_lowercase().contains(needle)
    });

    Self { ctx, list }
  }
}

impl View for NamespacesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.list.handle_key(key) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Enter => {
        let Some(ns) = self.list.selected() else {
          return ViewAction::None;
        };
        self.ctx.scope.set_namespaces([ns.name.clone()]);
        ViewAction::Switch(Box::new(PodsView::new(self.ctx.clone())))
      }
      KeyCode::Char('a') => {
        self.ctx.scope.clear_namespaces();
        ViewAction::None
      }
      _ => ViewAction::Unhandled,
    }
  }

  fn handle_mouse(&mut self, mouse: MouseEvent) {
    self.list.handle_mouse(mouse);
  }

  fn tick(&mut self) -> ViewAction {
    self.list.tick();
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let selected: Vec<String> = self.ctx.scope.namespaces();
    let header = Line::from(format!("{:<3}{:<32}{:<14}{:>5}", "", "NAME", "STATUS", "AGE"));

    self.list.render(frame, area, "Namespaces", header, |ns, _global| {
      let in_scope = selected.contains(&ns.name);
      let marker = if in_scope { " * " } else { "   " };
      let status_color = match ns.status.as_str() {
        "Active" => Color::Green,
        "Terminating" => Color::Yellow,
        _ => Color::White,
      };
      Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw(format!("{:<32}", truncate(&ns.name, 31))),
        Span::styled(
          format!("{:<14}", ns.status),
          Style::default().fg(status_color),
        ),
        Span::raw(format!("{:>5}", ns.age)),
      ])
    });
  }

  fn breadcrumb_label(&self) -> String {
    "Namespaces".to_string()
  }
}
