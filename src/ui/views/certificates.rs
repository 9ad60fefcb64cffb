use crate::api::types::Certificate;
use crate::app::AppContext;
use crate::sync::ResourceSync;
use crate::ui::renderfns::{condition_color, truncate};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::list::ResourceList;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::prelude::*;

/// cert-manager certificate list
pub struct CertificatesView {
  ctx: AppContext,
  list: ResourceList<Certificate>,
}

impl CertificatesView {
  pub fn new(ctx: AppContext) -> Self {
    let api = ctx.api.clone();
    let fetch_scope = ctx.scope.clone();
    let key_scope = ctx.scope.clone();
    let sync = ResourceSync::new(
      "certificates",
      ctx.store.clone(),
      move || key_scope.cache_key(),
      move || {
        let api = api.clone();
        let namespaces = fetch_scope.namespaces();
        async move { api.get_certificates(&namespaces).await.map_err(|e| e.to_string()) }
      },
    )
    .with_options(ctx.sync);

    let list = ResourceList::new(sync, ctx.scope.clone(), |cert: &Certificate, needle| {
      cert.name.to_lowercase().contains(needle)
        || cert.namespace.to_lowercase().contains(needle)
        || cert.issuer.to_lowercase().contains(needle)
    });

    Self { ctx, list }
  }
}

impl View for CertificatesView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.list.handle_key(key) {
      ViewAction::None
    } else {
      ViewAction::Unhandled
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
      "{:<16}{:<28}{:<7}{:<22}{:<22}{:>5}",
      "NAMESPACE", "NAME", "READY", "ISSUER", "EXPIRES", "AGE"
    ));

    let title = format!("Certificates @ {}", self.ctx.scope.label());
    self.list.render(frame, area, &title, header, |cert, _global| {
      Line::from(vec![
        Span::styled(
          format!("{:<16}", truncate(&cert.namespace, 15)),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("{:<28}", truncate(&cert.name, 27))),
        Span::styled(
          format!("{:<7}", cert.ready),
          Style::default().fg(condition_color(&cert.ready)),
        ),
        Span::raw(format!("{:<22}", truncate(&cert.issuer, 21))),
        Span::raw(format!("{:<22}", truncate(&cert.expires, 21))),
        Span::raw(format!("{:>5}", cert.age)),
      ])
    });
  }

  fn breadcrumb_label(&self) -> String {
    "Certificates".to_string()
  }
}
