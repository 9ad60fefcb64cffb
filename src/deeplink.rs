//! Cross-view deep links: "highlight pod P in namespace N" or "open logs
//! for P", raised by one view and consumed by another.
//!
//! The request travels as one typed object on a shared bus; there is no
//! separate pending flag, presence of the request is the flag. The
//! destination view checks its list when the request arrives, retries once
//! after a fixed delay to ride out cache staleness, and past a fixed
//! timeout degrades to a synthetic placeholder row so the user still gets a
//! panel instead of silence. Exactly one of those three resolutions happens
//! per request, and both windows count from the moment the request was
//! raised.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Second look after a miss, to let an in-flight fetch land.
pub const RETRY_DELAY: Duration = Duration::from_millis(1_000);

/// After this the target is assumed out of view and a placeholder is used.
pub const FALLBACK_TIMEOUT: Duration = Duration::from_millis(3_000);

/// How long a deep-linked row stays flash-highlighted.
pub const FLASH_DURATION: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeepLinkKind {
  /// Scroll to the row and flash-highlight it.
  Highlight,
  /// Open the logs panel for the target.
  OpenLogs,
}

/// One cross-view request. Created by the initiating view, consumed by
/// exactly one destination view.
#[derive(Debug, Clone)]
pub struct DeepLinkRequest {
  pub kind: DeepLinkKind,
  pub name: String,
  pub namespace: String,
  /// When the initiating view raised the request. The retry and fallback
  /// windows anchor here, not at the destination's first check.
  pub created_at: Instant,
}

impl DeepLinkRequest {
  pub fn new(kind: DeepLinkKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
    Self {
      kind,
      name: name.into(),
      namespace: namespace.into(),
      created_at: Instant::now(),
    }
  }
}

/// Shared single-slot channel for deep-link requests. Publishing replaces
/// any request nobody picked up yet.
#[derive(Clone, Default)]
pub struct DeepLinkBus {
  slot: Arc<Mutex<Option<DeepLinkRequest>>>,
}

impl DeepLinkBus {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn publish(&self, request: DeepLinkRequest) {
    *self.lock() = Some(request);
  }

  /// Claim the pending request, leaving the bus empty.
  pub fn take(&self) -> Option<DeepLinkRequest> {
    self.lock().take()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Option<DeepLinkRequest>> {
    self.slot.lock().unwrap_or_else(|e| e.into_inner())
  }
}

/// Rows a deep link can land on.
pub trait DeepLinkTarget {
  fn matches(&self, name: &str, namespace: &str) -> bool;

  /// Minimal synthetic record standing in for a target that never showed
  /// up in the list.
  fn placeholder(name: &str, namespace: &str) -> Self;
}

/// How a request resolved. `index` points into the row slice handed to
/// [`DeepLinkResolver::poll`].
#[derive(Debug)]
pub enum DeepLinkOutcome<T> {
  Found { index: usize, kind: DeepLinkKind },
  Fallback { item: T, kind: DeepLinkKind },
}

struct PendingLink {
  request: DeepLinkRequest,
  retry_at: Instant,
  deadline: Instant,
  retried: bool,
}

/// Destination-side state machine. Owned by the consuming view and dropped
/// with it, which also cancels any scheduled retry/fallback.
pub struct DeepLinkResolver {
  bus: DeepLinkBus,
  pending: Option<PendingLink>,
}

impl DeepLinkResolver {
  pub fn new(bus: DeepLinkBus) -> Self {
    Self { bus, pending: None }
  }

  /// Advance the protocol against the current row list. Call on every tick;
  /// cheap when nothing is pending.
  pub fn poll<T: DeepLinkTarget>(&mut self, rows: &[T], now: Instant) -> Option<DeepLinkOutcome<T>> {
    if self.pending.is_none() {
      let request = self.bus.take()?;
      // First check. A hit here resolves immediately and no fallback timer
      // ever starts.
      if let Some(index) = Self::find(rows, &request) {
        return Some(DeepLinkOutcome::Found {
          index,
          kind: request.kind,
        });
      }
      self.pending = Some(PendingLink {
        retry_at: request.created_at + RETRY_DELAY,
        deadline: request.created_at + FALLBACK_TIMEOUT,
        retried: false,
        request,
      });
      return None;
    }

    let pending = self.pending.as_mut()?;

    if !pending.retried && now >= pending.retry_at {
      pending.retried = true;
      if let Some(index) = Self::find(rows, &pending.request) {
        let kind = pending.request.kind;
        self.pending = None;
        return Some(DeepLinkOutcome::Found { index, kind });
      }
    }

    if now >= pending.deadline {
      let request = self.pending.take()?.request;
      tracing::info!(
        name = %request.name,
        namespace = %request.namespace,
        "deep-link target not found, opening placeholder"
      );
      return Some(DeepLinkOutcome::Fallback {
        item: T::placeholder(&request.name, &request.namespace),
        kind: request.kind,
      });
    }

    None
  }

  fn find<T: DeepLinkTarget>(rows: &[T], request: &DeepLinkRequest) -> Option<usize> {
    rows
      .iter()
      .position(|row| row.matches(&request.name, &request.namespace))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, PartialEq)]
  struct Row {
    name: String,
    namespace: String,
  }

  impl Row {
    fn new(name: &str, namespace: &str) -> Self {
      Self {
        name: name.to_string(),
        namespace: namespace.to_string(),
      }
    }
  }

  impl DeepLinkTarget for Row {
    fn matches(&self, name: &str, namespace: &str) -> bool {
      self.name == name && self.namespace == namespace
    }

    fn placeholder(name: &str, namespace: &str) -> Self {
      Self::new(name, namespace)
    }
  }

  fn highlight(name: &str, namespace: &str) -> DeepLinkRequest {
    DeepLinkRequest::new(DeepLinkKind::Highlight, name, namespace)
  }

  fn highlight_at(name: &str, namespace: &str, at: Instant) -> DeepLinkRequest {
    DeepLinkRequest {
      created_at: at,
      ..highlight(name, namespace)
    }
  }

  #[test]
  fn test_immediate_hit_resolves_without_timers() {
    let bus = DeepLinkBus::new();
    let mut resolver = DeepLinkResolver::new(bus.clone());
    let rows = vec![Row::new("worker-7", "default"), Row::new("worker-8", "default")];

    bus.publish(highlight("worker-7", "default"));

    let t0 = Instant::now();
    match resolver.poll(&rows, t0) {
      Some(DeepLinkOutcome::Found { index: 0, kind: DeepLinkKind::Highlight }) => {}
      other => panic!("expected immediate hit, got {other:?}"),
    }

    // Bus is drained and nothing fires later, not even past the timeout.
    assert!(bus.take().is_none());
    assert!(resolver.poll(&rows, t0 + Duration::from_secs(10)).is_none());
  }

  #[test]
  fn test_miss_resolves_at_retry_not_before() {
    let bus = DeepLinkBus::new();
    let mut resolver = DeepLinkResolver::new(bus.clone());
    bus.publish(highlight("worker-7", "default"));

    let t0 = Instant::now();
    // First check against an empty list schedules the retry
    assert!(resolver.poll(&Vec::<Row>::new(), t0).is_none());

    // A fetch lands at +600ms with the target present, but resolution
    // waits for the retry check
    let rows = vec![Row::new("worker-7", "default")];
    assert!(resolver.poll(&rows, t0 + Duration::from_millis(600)).is_none());

    match resolver.poll(&rows, t0 + Duration::from_millis(1_000)) {
      Some(DeepLinkOutcome::Found { index: 0, .. }) => {}
      other => panic!("expected retry hit, got {other:?}"),
    }

    // The fallback scheduled for +3000ms was cancelled by the resolution
    assert!(resolver.poll(&rows, t0 + Duration::from_millis(3_500)).is_none());
  }

  #[test]
  fn test_fallback_fires_exactly_once() {
    let bus = DeepLinkBus::new();
    let mut resolver = DeepLinkResolver::new(bus.clone());
    bus.publish(DeepLinkRequest::new(DeepLinkKind::OpenLogs, "worker-7", "default"));

    let t0 = Instant::now();
    let empty = Vec::<Row>::new();
    assert!(resolver.poll(&empty, t0).is_none());
    assert!(resolver.poll(&empty, t0 + Duration::from_millis(1_000)).is_none());
    assert!(resolver.poll(&empty, t0 + Duration::from_millis(2_000)).is_none());

    match resolver.poll(&empty, t0 + Duration::from_millis(3_000)) {
      Some(DeepLinkOutcome::Fallback { item, kind: DeepLinkKind::OpenLogs }) => {
        assert_eq!(item, Row::new("worker-7", "default"));
      }
      other => panic!("expected fallback, got {other:?}"),
    }

    // Cleared: no second placeholder, no re-trigger
    assert!(resolver.poll(&empty, t0 + Duration::from_millis(4_000)).is_none());
  }

  #[test]
  fn test_retry_window_anchors_at_request_creation() {
    let bus = DeepLinkBus::new();
    let mut resolver = DeepLinkResolver::new(bus.clone());
    let t0 = Instant::now();
    bus.publish(highlight_at("worker-7", "default", t0));

    // The destination view only gets around to its first check at +800ms
    let empty = Vec::<Row>::new();
    assert!(resolver.poll(&empty, t0 + Duration::from_millis(800)).is_none());

    // Retry is due at creation + 1s, not first check + 1s
    let rows = vec![Row::new("worker-7", "default")];
    assert!(matches!(
      resolver.poll(&rows, t0 + Duration::from_millis(1_000)),
      Some(DeepLinkOutcome::Found { index: 0, .. })
    ));
  }

  #[test]
  fn test_fallback_window_anchors_at_request_creation() {
    let bus = DeepLinkBus::new();
    let mut resolver = DeepLinkResolver::new(bus.clone());
    let t0 = Instant::now();
    bus.publish(highlight_at("worker-7", "default", t0));

    let empty = Vec::<Row>::new();
    assert!(resolver.poll(&empty, t0 + Duration::from_millis(2_900)).is_none());
    assert!(matches!(
      resolver.poll(&empty, t0 + Duration::from_millis(3_000)),
      Some(DeepLinkOutcome::Fallback { .. })
    ));
  }

  #[test]
  fn test_publish_replaces_unclaimed_request() {
    let bus = DeepLinkBus::new();
    bus.publish(highlight("old", "default"));
    bus.publish(highlight("new", "default"));

    let taken = bus.take().unwrap();
    assert_eq!(taken.name, "new");
    assert!(bus.take().is_none());
  }

  #[test]
  fn test_requests_are_independent() {
    let bus = DeepLinkBus::new();
    let mut resolver = DeepLinkResolver::new(bus.clone());
    let empty = Vec::<Row>::new();

    // First request falls all the way through to the placeholder
    bus.publish(highlight("a", "ns"));
    let t0 = Instant::now();
    resolver.poll(&empty, t0);
    resolver.poll(&empty, t0 + Duration::from_millis(1_000));
    assert!(matches!(
      resolver.poll(&empty, t0 + Duration::from_millis(3_000)),
      Some(DeepLinkOutcome::Fallback { .. })
    ));

    // A later request starts from a clean slate and can hit immediately
    bus.publish(highlight("b", "ns"));
    let rows = vec![Row::new("b", "ns")];
    assert!(matches!(
      resolver.poll(&rows, t0 + Duration::from_millis(5_000)),
      Some(DeepLinkOutcome::Found { index: 0, .. })
    ));
  }
}
