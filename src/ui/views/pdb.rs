use crate::api::types::DisruptionBudget;
use crate::app::AppContext;
use crate::deeplink::{DeepLinkKind, DeepLinkRequest};
use crate::sync::ResourceSync;
use crate::ui::renderfns::truncate;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::list::ResourceList;
use crate::ui::views::PodsView;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::prelude::*;

/// Pod disruption budget list. Enter jumps to the first covered pod in the
/// pod view; 'l' opens its logs directly.
pub struct PdbView {
  ctx: AppContext,
  list: ResourceList<DisruptionBudget>,
}

impl PdbView {
  pub fn new(ctx: AppContext) -> Self {
    let api = ctx.api.clone();
    let fetch_scope = ctx.scope.clone();
    let key_scope = ctx.scope.clone();
    let sync = ResourceSync::new(
      "poddisruptionbudgets",
      ctx.store.clone(),
      move || key_scope.cache_key(),
      move || {
        let api = api.clone();
        let namespaces = fetch_scope.namespaces();
        async move {
          api
            .get_disruption_budgets(&namespaces)
            .await
            .map_err(|e| e.to_string())
        }
      },
    )
    .with_options(ctx.sync);

    let list = ResourceList::new(sync, ctx.scope.clone(), |pdb: &DisruptionBudget, needle| {
      pdb.name.to_lowercase().contains(needle) || pdb.namespace.to_lowercase().contains(needle)
    });

    Self { ctx, list }
  }

  /// Hand the first covered pod over to the pod view via a deep link.
  fn link_to_covered_pod(&mut self, kind: DeepLinkKind) -> ViewAction {
    let Some(pdb) = self.list.selected() else {
      return ViewAction::None;
    };
    let Some(pod) = pdb.pods.first() else {
      return ViewAction::None;
    };
    self
      .ctx
      .links
      .publish(DeepLinkRequest::new(kind, pod.clone(), pdb.namespace.clone()));
    ViewAction::Switch(Box::new(PodsView::new(self.ctx.clone())))
  }
}

impl View for PdbView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.list.handle_key(key) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Enter => self.link_to_covered_pod(DeepLinkKind::Highlight),
      KeyCode::Char('l') => self.link_to_covered_pod(DeepLinkKind::OpenLogs),
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
    let header = Line::from(format!(
      "{:<16}{:<28}{:>4} {:>4} {:>8} {:>8} {:>6} {:>5}",
      "NAMESPACE", "NAME", "MIN", "MAX", "ALLOWED", "HEALTHY", "PODS", "AGE"
    ));

    let title = format!("Disruption Budgets @ {}", self.ctx.scope.label());
    self.list.render(frame, area, &title, header, |pdb, _global| {
      let allowed_color = if pdb.allowed_disruptions == 0 {
        Color::Red
      } else {
        Color::Green
      };
      Line::from(vec![
        Span::styled(
          format!("{:<16}", truncate(&pdb.namespace, 15)),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("{:<28}", truncate(&pdb.name, 27))),
        Span::raw(format!("{:>4} ", pdb.min_available)),
        Span::raw(format!("{:>4} ", pdb.max_unavailable)),
        Span::styled(
          format!("{:>8} ", pdb.allowed_disruptions),
          Style::default().fg(allowed_color),
        ),
        Span::raw(format!(
          "{:>8} ",
          format!("{}/{}", pdb.current_healthy, pdb.desired_healthy)
        )),
        Span::raw(format!("{:>6} ", pdb.pods.len())),
        Span::raw(format!("{:>5}", pdb.age)),
      ])
    });
  }

  fn breadcrumb_label(&self) -> String {
    "Disruption Budgets".to_string()
  }
}
