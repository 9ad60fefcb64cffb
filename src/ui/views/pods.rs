use crate::api::types::{Pod, PodMetrics};
use crate::app::AppContext;
use crate::deeplink::{DeepLinkKind, DeepLinkOutcome, DeepLinkResolver, FLASH_DURATION};
use crate::select::RowKey;
use crate::sync::{ResourceSync, SyncOptions, MUTATION_REFETCH_DELAY};
use crate::ui::renderfns::{phase_color, ready_color, truncate};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::list::ResourceList;
use crate::ui::views::LogsView;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::prelude::*;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Usage numbers refresh on their own, faster cadence
const METRICS_TTL: Duration = Duration::from_secs(10);

/// The main pod list. On top of the shared list scaffolding this view
/// joins in live metrics, consumes deep links from other views and offers
/// pod mutations.
pub struct PodsView {
  ctx: AppContext,
  list: ResourceList<Pod>,
  metrics: ResourceSync<PodMetrics>,
  resolver: DeepLinkResolver,
  /// Row key of the deep-linked pod plus when the flash started
  flash: Option<(String, Instant)>,
}

impl PodsView {
  pub fn new(ctx: AppContext) -> Self {
    let api = ctx.api.clone();
    let fetch_scope = ctx.scope.clone();
    let key_scope = ctx.scope.clone();
    let sync = ResourceSync::new(
      "pods",
      ctx.store.clone(),
      move || key_scope.cache_key(),
      move || {
        let api = api.clone();
        let namespaces = fetch_scope.namespaces();
        async move { api.get_pods(&namespaces).await.map_err(|e| e.to_string()) }
      },
    )
    .with_options(ctx.sync);

    let list = ResourceList::new(sync, ctx.scope.clone(), |pod: &Pod, needle| {
      pod.name.to_lowercase().contains(needle)
        || pod.namespace.to_lowercase().contains(needle)
        || pod.status.to_lowercase().contains(needle)
        || pod.node.to_lowercase().contains(needle)
    });

    let api = ctx.api.clone();
    let cluster_scope = ctx.scope.clone();
    let metrics = ResourceSync::new(
      "pod-metrics",
      ctx.store.clone(),
      move || cluster_scope.cluster(),
      move || {
        let api = api.clone();
        async move { api.get_pod_metrics().await.map_err(|e| e.to_string()) }
      },
    )
    .with_options(SyncOptions {
      ttl: METRICS_TTL,
      background_refresh: true,
    });

    let resolver = DeepLinkResolver::new(ctx.links.clone());

    Self {
      ctx,
      list,
      metrics,
      resolver,
      flash: None,
    }
  }

  fn open_logs(&self, pod: Pod) -> ViewAction {
    ViewAction::Push(Box::new(LogsView::new(pod, self.ctx.api.clone())))
  }

  fn delete_selected(&mut self) {
    let Some(pod) = self.list.selected().cloned() else {
      return;
    };
    let api = self.ctx.api.clone();
    let (namespace, name) = (pod.namespace, pod.name);
    tokio::spawn(async move {
      if let Err(e) = api.delete_pod(&namespace, &name).await {
        tracing::error!(%namespace, %name, "pod delete failed: {e}");
      }
    });
    // Give the control plane a moment before refetching
    self.list.sync_mut().refetch_after(MUTATION_REFETCH_DELAY);
  }

  fn restart_selected(&mut self) {
    let Some(pod) = self.list.selected().cloned() else {
      return;
    };
    let api = self.ctx.api.clone();
    let (namespace, name) = (pod.namespace, pod.name);
    tokio::spawn(async move {
      if let Err(e) = api.restart_pod(&namespace, &name).await {
        tracing::error!(%namespace, %name, "pod restart failed: {e}");
      }
    });
    self.list.sync_mut().refetch_after(MUTATION_REFETCH_DELAY);
  }
}

impl View for PodsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      match key.code {
        KeyCode::Char('d') => {
          self.delete_selected();
          return ViewAction::None;
        }
        KeyCode::Char('r') => {
          self.restart_selected();
          return ViewAction::None;
        }
        _ => {}
      }
    }

    if self.list.handle_key(key) {
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Enter | KeyCode::Char('l') => match self.list.selected() {
        Some(pod) => {
          let pod = pod.clone();
          self.open_logs(pod)
        }
        None => ViewAction::None,
      },
      _ => ViewAction::Unhandled,
    }
  }

  fn handle_mouse(&mut self, mouse: MouseEvent) {
    self.list.handle_mouse(mouse);
  }

  fn tick(&mut self) -> ViewAction {
    self.list.tick();
    self.metrics.tick(Instant::now());

    if let Some((_, started)) = &self.flash {
      if started.elapsed() >= FLASH_DURATION {
        self.flash = None;
      }
    }

    match self.resolver.poll(self.list.rows(), Instant::now()) {
      Some(DeepLinkOutcome::Found { index, kind }) => {
        self.list.select_index(index);
        if let Some(pod) = self.list.rows().get(index) {
          self.flash = Some((pod.row_key(), Instant::now()));
          if kind == DeepLinkKind::OpenLogs {
            let pod = pod.clone();
            return self.open_logs(pod);
          }
        }
        ViewAction::None
      }
      // The target never showed up; open a panel on a synthetic record so
      // the request still lands somewhere visible
      Some(DeepLinkOutcome::Fallback { item, .. }) => self.open_logs(item),
      None => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let metrics: HashMap<(String, String), (String, String)> = self
      .metrics
      .rows()
      .iter()
      .map(|m| {
        (
          (m.namespace.clone(), m.name.clone()),
          (m.cpu.clone(), m.memory.clone()),
        )
      })
      .collect();
    let flash = self.flash.clone();

    let header = Line::from(format!(
      "{:<16}{:<28}{:<7}{:<18}{:>4}  {:>7} {:>8}  {:>5}  {}",
      "NAMESPACE", "NAME", "READY", "STATUS", "RST", "CPU", "MEM", "AGE", "NODE"
    ));

    let title = format!("Pods @ {}", self.ctx.scope.label());
    self.list.render(frame, area, &title, header, |pod, _global| {
      let (cpu, mem) = metrics
        .get(&(pod.namespace.clone(), pod.name.clone()))
        .cloned()
        .unwrap_or_else(|| ("-".to_string(), "-".to_string()));

      let mut line = Line::from(vec![
        Span::styled(
          format!("{:<16}", truncate(&pod.namespace, 15)),
          Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("{:<28}", truncate(&pod.name, 27))),
        Span::styled(
          format!("{:<7}", pod.ready),
          Style::default().fg(ready_color(&pod.ready)),
        ),
        Span::styled(
          format!("{:<18}", truncate(&pod.status, 17)),
          Style::default().fg(phase_color(&pod.status)),
        ),
        Span::raw(format!("{:>4}  ", pod.restarts)),
        Span::raw(format!("{:>7} {:>8}  ", cpu, mem)),
        Span::raw(format!("{:>5}  ", pod.age)),
        Span::raw(truncate(&pod.node, 20)),
      ]);

      let flashing = flash.as_ref().is_some_and(|(key, _)| *key == pod.row_key());
      if flashing {
        line = line.style(Style::default().bg(Color::Yellow).fg(Color::Black));
      }
      line
    });
  }

  fn breadcrumb_label(&self) -> String {
    format!("Pods [{}]", self.ctx.scope.label())
  }
}
