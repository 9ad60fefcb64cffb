use crate::api::types::VolumeClaim;
use crate::app::AppContext;
use crate::deeplink::{DeepLinkKind, DeepLinkRequest};
use crate::sync::ResourceSync;
use crate::ui::renderfns::truncate;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::list::ResourceList;
use crate::ui::views::PodsView;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::prelude::*;

/// Persistent volume claim list. Enter jumps to the mounting pod; 'l'
/// opens its logs.
pub struct StorageView {
  ctx: AppContext,
  list: ResourceList<VolumeClaim>,
}

impl StorageView {
  pub fn new(ctx: AppContext) -> Self {
    let api = ctx.api.clone();
    let fetch_scope = ctx.scope.clone();
    let key_scope = ctx.scope.clone();
    let sync = ResourceSync::new(
      "persistentvolumeclaims",
      ctx.store.clone(),
      move || key_scope.cache_key(),
      move || {
        let api = api.clone();
        let namespaces = fetch_scope.namespaces();
        async move {
          api
            .get_volume_claims(&namespaces)
            .await
            .map_err(|e| e.to_string())
        }
      },
    )
    .with_options(ctx.sync);

    let list = ResourceList::new(sync, ctx.scope.clone(), |pvc: &VolumeClaim, needle| {
      pvc.name.to_lowercase().contains(needle)
        || pvc.namespace.to_lowercase().contains(needle)
        || pvc.storage_class.to_lowercase().contains(needle)
    });

    Self { ctx, list }
  }

  fn link_to_mounting_pod(&mut self, kind: DeepLinkKind) -> ViewAction {
    let Some(pvc) = self.list.selected() else {
      return ViewAction::None;
    };
    let Some(pod) = &pvc.mounted_by else {
      return ViewAction::None;
    };
    self
      .ctx
      .links
      .publish(DeepLinkRequest::new(kind, pod.clone(), pvc.namespace.clone()));
    ViewAction::Switch(Box::new(PodsView::new(self.ctx.clone())))
  }
}

impl View for StorageView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.list.handle_key(key) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Enter => self.link_to_mounting_pod(DeepLinkKind::Highlight),
      KeyCode::Char('l') => self.link_to_mounting_pod(DeepLinkKind::OpenLogs),
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
      "{:<16}{:<28}{:<10}{:<20}{:>9}  {:<14}{:>5}",
      "NAMESPACE", "NAME", "STATUS", "VOLUME", "CAPACITY", "CLASS", "AGE"
    ));

    let title = format!("Volume Claims @ {}", self.ctx.scope.label());
    self.list.render(frame, area, &title, header, |pvc, _global| {
      let status_color = match pvc.status.as_str() {
        "Bound" => Color::Green,
        "Pending" => Color::Yellow,
        "Lost" => Color::Red,
        _ => Color::White,
      };
      Line::from(vec![
        Span::styled(
          format!("{:<16}", truncate(&pvc.namespace, 15)),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("{:<28}", truncate(&pvc.name, 27))),
        Span::styled(
          format!("{:<10}", pvc.status),
          Style::default().fg(status_color),
        ),
        Span::raw(format!("{:<20}", truncate(&pvc.volume, 19))),
        Span::raw(format!("{:>9}  ", pvc.capacity)),
        Span::raw(format!("{:<14}", truncate(&pvc.storage_class, 13))),
        Span::raw(format!("{:>5}", pvc.age)),
      ])
    });
  }

  fn breadcrumb_label(&self) -> String {
    "Volume Claims".to_string()
  }
}
