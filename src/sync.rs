//! Background-refreshed resource fetching with cache-first paints.
//!
//! `ResourceSync<T>` owns the fetch-vs-cache decision for one resource list
//! in one view: blocking fetch on first miss or scope change, instant paint
//! from [`CacheStore`] on a hit with an optional non-blocking refresh behind
//! it, and a per-instance polling timer that refreshes only once the cached
//! entry is older than its TTL.
//!
//! Results come back over an unbounded channel and are applied when the
//! owning view pumps [`ResourceSync::tick`] from its event-loop tick, so a
//! fetch that completes after the view was dropped simply has nowhere to
//! deliver. Fetches are deliberately not fenced against each other: if a
//! manual `refetch()` and a background refresh overlap, whichever completes
//! last wins the cache and the screen.
//!
//! # Example
//!
//! ```ignore
//! let mut sync = ResourceSync::new("pods", store, move || scope.cache_key(), move || {
//!     let client = client.clone();
//!     let scope = scope.clone();
//!     async move { client.get_pods(&scope.namespaces()).await.map_err(|e| e.to_string()) }
//! });
//!
//! // In the view's tick handler:
//! if sync.tick(Instant::now()) {
//!     // state changed, selection may need reconciling
//! }
//! ```

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::cache::CacheStore;

/// Default staleness window for cached lists.
pub const DEFAULT_TTL: Duration = Duration::from_millis(15_000);

/// Ceiling on the polling interval; the timer fires at `min(ttl, ceiling)`
/// and checks cache age on each tick, so several ticks may pass before an
/// entry actually goes stale.
const POLL_CEILING: Duration = Duration::from_millis(15_000);

/// How long to wait before the foreground refetch that follows a successful
/// mutation. The backend is eventually consistent; refetching immediately
/// tends to read back the pre-mutation list.
pub const MUTATION_REFETCH_DELAY: Duration = Duration::from_millis(1_000);

/// Per-resource polling configuration.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
  pub ttl: Duration,
  pub background_refresh: bool,
}

impl Default for SyncOptions {
  fn default() -> Self {
    Self {
      ttl: DEFAULT_TTL,
      background_refresh: true,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOrigin {
  /// Blocking fetch: the view shows a loading state until it lands.
  Foreground,
  /// Refresh behind an already-painted list; failures are only logged.
  Background,
}

/// A completed fetch, tagged with the cache key it was issued under.
struct FetchOutcome<T> {
  origin: FetchOrigin,
  key: String,
  result: Result<Vec<T>, String>,
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, String>> + Send>>;
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send>;
type KeyFn = Box<dyn Fn() -> String + Send>;

/// Fetch orchestrator for one resource list in one view instance.
pub struct ResourceSync<T> {
  resource_type: &'static str,
  store: CacheStore,
  key_fn: KeyFn,
  fetcher: FetcherFn<T>,
  options: SyncOptions,

  data: Option<Vec<T>>,
  error: Option<String>,
  observed_key: Option<String>,
  foreground_inflight: usize,

  tx: mpsc::UnboundedSender<FetchOutcome<T>>,
  rx: mpsc::UnboundedReceiver<FetchOutcome<T>>,

  next_poll: Option<Instant>,
  pending_refetch: Option<Instant>,
}

impl<T> ResourceSync<T>
where
  T: Serialize + DeserializeOwned + Send + 'static,
{
  /// Create a sync engine for `resource_type`.
  ///
  /// `key_fn` is the injected read-only accessor for the active filter
  /// scope; the engine never reaches into globals. `fetcher` must resolve
  /// to the full replacement list on success.
  pub fn new<K, F, Fut>(resource_type: &'static str, store: CacheStore, key_fn: K, fetcher: F) -> Self
  where
    K: Fn() -> String + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, String>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      resource_type,
      store,
      key_fn: Box::new(key_fn),
      fetcher: Box::new(move || Box::pin(fetcher())),
      options: SyncOptions::default(),
      data: None,
      error: None,
      observed_key: None,
      foreground_inflight: 0,
      tx,
      rx,
      next_poll: None,
      pending_refetch: None,
    }
  }

  pub fn with_options(mut self, options: SyncOptions) -> Self {
    self.options = options;
    self
  }

  /// Rows currently visible to the view (empty until the first paint).
  pub fn rows(&self) -> &[T] {
    self.data.as_deref().unwrap_or(&[])
  }

  pub fn has_data(&self) -> bool {
    self.data.is_some()
  }

  /// True only while a foreground fetch is in flight; background refreshes
  /// never flip this.
  pub fn is_loading(&self) -> bool {
    self.foreground_inflight > 0
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Manually triggered blocking fetch, bypassing freshness checks. Used by
  /// the explicit refresh keybinding and the post-mutation refetch.
  pub fn refetch(&mut self) {
    let key = (self.key_fn)();
    self.observed_key = Some(key.clone());
    self.start_fetch(FetchOrigin::Foreground, key);
  }

  /// Schedule a single foreground refetch after `delay`.
  pub fn refetch_after(&mut self, delay: Duration) {
    self.pending_refetch = Some(Instant::now() + delay);
  }

  /// Drive the engine: reconcile against the current cache key, fire due
  /// timers, and apply completed fetches. Returns `true` if visible state
  /// changed. Call this once per event-loop tick.
  pub fn tick(&mut self, now: Instant) -> bool {
    let mut changed = self.ensure();

    if let Some(at) = self.pending_refetch {
      if now >= at {
        self.pending_refetch = None;
        self.refetch();
        changed = true;
      }
    }

    if self.options.background_refresh {
      let due = match self.next_poll {
        None => {
          self.next_poll = Some(now + self.poll_interval());
          false
        }
        Some(at) => now >= at,
      };
      if due {
        self.next_poll = Some(now + self.poll_interval());
        if let Some(key) = self.observed_key.clone() {
          let stale = self
            .store
            .age(self.resource_type, &key)
            .and_then(|age| age.to_std().ok())
            .is_some_and(|age| age >= self.options.ttl);
          if stale {
            self.start_fetch(FetchOrigin::Background, key);
          }
        }
      }
    }

    if self.drain() {
      changed = true;
    }
    changed
  }

  /// Step the activation state machine against the current cache key.
  fn ensure(&mut self) -> bool {
    let key = (self.key_fn)();
    match &self.observed_key {
      None => {
        // First activation: paint from cache if we can, otherwise block.
        self.observed_key = Some(key.clone());
        if let Some(hit) = self.store.get::<T>(self.resource_type, &key) {
          self.data = Some(hit.items);
          self.error = None;
          if self.options.background_refresh {
            self.start_fetch(FetchOrigin::Background, key);
          }
        } else {
          self.start_fetch(FetchOrigin::Foreground, key);
        }
        true
      }
      Some(observed) if *observed != key => {
        // Scope changed: rows from the old scope must not linger on screen.
        self.observed_key = Some(key.clone());
        self.data = None;
        self.error = None;
        self.start_fetch(FetchOrigin::Foreground, key);
        true
      }
      Some(_) => {
        if self.data.is_none() && self.error.is_none() && !self.is_loading() {
          if let Some(hit) = self.store.get::<T>(self.resource_type, &key) {
            self.data = Some(hit.items);
            if self.options.background_refresh {
              self.start_fetch(FetchOrigin::Background, key);
            }
          } else {
            self.start_fetch(FetchOrigin::Foreground, key);
          }
          true
        } else {
          false
        }
      }
    }
  }

  fn poll_interval(&self) -> Duration {
    self.options.ttl.min(POLL_CEILING)
  }

  fn start_fetch(&mut self, origin: FetchOrigin, key: String) {
    if origin == FetchOrigin::Foreground {
      self.foreground_inflight += 1;
    }
    let future = (self.fetcher)();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver gone means the view unmounted; nothing to deliver to.
      let _ = tx.send(FetchOutcome { origin, key, result });
    });
  }

  /// Apply completed fetches in completion order. The last one drained wins
  /// the cache and the visible rows.
  fn drain(&mut self) -> bool {
    let mut changed = false;
    while let Ok(outcome) = self.rx.try_recv() {
      changed = true;
      self.apply(outcome);
    }
    changed
  }

  fn apply(&mut self, outcome: FetchOutcome<T>) {
    if outcome.origin == FetchOrigin::Foreground {
      self.foreground_inflight = self.foreground_inflight.saturating_sub(1);
    }
    let key_current = self.observed_key.as_deref() == Some(outcome.key.as_str());

    match outcome.result {
      Ok(items) => {
        // Written under the key the fetch was issued for, not whatever the
        // scope says now.
        self.store.put(self.resource_type, &outcome.key, &items);
        if key_current {
          self.data = Some(items);
          self.error = None;
        }
      }
      Err(e) => match outcome.origin {
        FetchOrigin::Background => {
          // Never blank an already-rendered list over a background failure.
          tracing::warn!(
            resource_type = self.resource_type,
            error = %e,
            "background refresh failed"
          );
        }
        FetchOrigin::Foreground => {
          if !key_current {
            tracing::warn!(
              resource_type = self.resource_type,
              error = %e,
              "fetch for a superseded scope failed"
            );
            return;
          }
          // Fall back to any cache entry before surfacing a bare error.
          if self.data.is_none() {
            if let Some(hit) = self.store.get::<T>(self.resource_type, &outcome.key) {
              self.data = Some(hit.items);
            }
          }
          self.error = Some(e);
        }
      },
    }
  }

  #[cfg(test)]
  fn make_poll_due(&mut self) {
    self.next_poll = Some(Instant::now());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::{Arc, Mutex};

  fn fixed_key(key: &str) -> impl Fn() -> String + Send + 'static {
    let key = key.to_string();
    move || key.clone()
  }

  async fn settle<T: Serialize + DeserializeOwned + Send + 'static>(sync: &mut ResourceSync<T>) {
    tokio::time::sleep(Duration::from_millis(30)).await;
    sync.tick(Instant::now());
  }

  #[tokio::test]
  async fn test_initial_miss_blocks_and_fills_cache() {
    let store = CacheStore::new();
    let mut sync = ResourceSync::new("pods", store.clone(), fixed_key("prod::"), || async {
      Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    });

    sync.tick(Instant::now());
    assert!(sync.is_loading());
    assert!(sync.rows().is_empty());

    settle(&mut sync).await;
    assert!(!sync.is_loading());
    assert_eq!(sync.rows(), ["a", "b", "c"]);
    assert_eq!(store.get::<String>("pods", "prod::").unwrap().items, ["a", "b", "c"]);
  }

  #[tokio::test]
  async fn test_cache_hit_paints_without_loading() {
    let store = CacheStore::new();
    store.put("pods", "prod::", &["cached".to_string()]);

    let calls = Arc::new(AtomicU32::new(0));
    let calls2 = calls.clone();
    let mut sync = ResourceSync::new("pods", store, fixed_key("prod::"), move || {
      let calls = calls2.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["fresh".to_string()])
      }
    });

    sync.tick(Instant::now());
    // Painted synchronously, no blocking fetch
    assert!(!sync.is_loading());
    assert_eq!(sync.rows(), ["cached"]);

    // ...but a background refresh was issued and lands later
    settle(&mut sync).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sync.rows(), ["fresh"]);
  }

  #[tokio::test]
  async fn test_cache_hit_without_background_refresh_stays_put() {
    let store = CacheStore::new();
    store.put("pods", "prod::", &["cached".to_string()]);

    let calls = Arc::new(AtomicU32::new(0));
    let calls2 = calls.clone();
    let mut sync = ResourceSync::new("pods", store, fixed_key("prod::"), move || {
      let calls = calls2.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["fresh".to_string()])
      }
    })
    .with_options(SyncOptions {
      ttl: DEFAULT_TTL,
      background_refresh: false,
    });

    sync.tick(Instant::now());
    settle(&mut sync).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(sync.rows(), ["cached"]);
  }

  #[tokio::test]
  async fn test_poll_refreshes_only_stale_entries() {
    let store = CacheStore::new();
    store.put("pods", "prod::", &["a".to_string(), "b".to_string(), "c".to_string()]);

    let calls = Arc::new(AtomicU32::new(0));
    let calls2 = calls.clone();
    let mut sync = ResourceSync::new("pods", store.clone(), fixed_key("prod::"), move || {
      let calls = calls2.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["a".to_string(), "c".to_string(), "d".to_string()])
      }
    })
    .with_options(SyncOptions {
      ttl: Duration::from_millis(15_000),
      background_refresh: false,
    });

    // Paint from cache; background refresh disabled so no fetch yet.
    sync.tick(Instant::now());
    assert_eq!(sync.rows(), ["a", "b", "c"]);

    // Re-enable polling and force a due poll tick while the entry is fresh:
    // age < ttl, so no refresh fires.
    sync.options.background_refresh = true;
    sync.make_poll_due();
    sync.tick(Instant::now());
    settle(&mut sync).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    // Age the entry past the TTL: the next due poll refreshes.
    store.backdate("pods", "prod::", chrono::Duration::seconds(20));
    sync.make_poll_due();
    sync.tick(Instant::now());
    settle(&mut sync).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sync.rows(), ["a", "c", "d"]);
    assert_eq!(store.get::<String>("pods", "prod::").unwrap().items, ["a", "c", "d"]);
  }

  #[tokio::test]
  async fn test_background_failure_never_blanks_rendered_list() {
    let store = CacheStore::new();
    store.put("pods", "prod::", &["a".to_string()]);

    let mut sync = ResourceSync::new("pods", store.clone(), fixed_key("prod::"), || async {
      Err::<Vec<String>, _>("boom".to_string())
    })
    .with_options(SyncOptions {
      ttl: Duration::from_millis(15_000),
      background_refresh: false,
    });

    sync.tick(Instant::now());
    assert_eq!(sync.rows(), ["a"]);

    sync.options.background_refresh = true;
    store.backdate("pods", "prod::", chrono::Duration::seconds(20));
    sync.make_poll_due();
    sync.tick(Instant::now());
    settle(&mut sync).await;

    assert_eq!(sync.rows(), ["a"]);
    assert!(sync.error().is_none());
    assert_eq!(store.get::<String>("pods", "prod::").unwrap().items, ["a"]);
  }

  #[tokio::test]
  async fn test_foreground_failure_falls_back_to_cache() {
    let store = CacheStore::new();
    // Only the second scope has a cache entry to fall back to.
    store.put("pods", "prod::b", &["stale-b".to_string()]);

    let key = Arc::new(Mutex::new("prod::a".to_string()));
    let key2 = key.clone();
    let mut sync = ResourceSync::new(
      "pods",
      store,
      move || key2.lock().unwrap().clone(),
      || async { Err::<Vec<String>, _>("unreachable backend".to_string()) },
    );

    sync.tick(Instant::now());
    settle(&mut sync).await;
    // No fallback under prod::a: error with no data
    assert!(sync.rows().is_empty());
    assert_eq!(sync.error(), Some("unreachable backend"));

    *key.lock().unwrap() = "prod::b".to_string();
    sync.tick(Instant::now());
    settle(&mut sync).await;
    // Fallback entry keeps the view populated despite the error
    assert_eq!(sync.rows(), ["stale-b"]);
    assert_eq!(sync.error(), Some("unreachable backend"));
  }

  #[tokio::test]
  async fn test_overlapping_fetches_last_completed_wins() {
    let store = CacheStore::new();
    let calls = Arc::new(AtomicU32::new(0));
    let calls2 = calls.clone();

    // First call is slow, second is fast; the slow one completes last.
    let mut sync = ResourceSync::new("pods", store.clone(), fixed_key("prod::"), move || {
      let call = calls2.fetch_add(1, Ordering::SeqCst);
      async move {
        if call == 0 {
          tokio::time::sleep(Duration::from_millis(80)).await;
          Ok(vec!["slow".to_string()])
        } else {
          tokio::time::sleep(Duration::from_millis(10)).await;
          Ok(vec!["fast".to_string()])
        }
      }
    });

    sync.tick(Instant::now());
    sync.refetch();
    assert!(sync.is_loading());

    tokio::time::sleep(Duration::from_millis(40)).await;
    sync.tick(Instant::now());
    assert_eq!(sync.rows(), ["fast"]);

    tokio::time::sleep(Duration::from_millis(80)).await;
    sync.tick(Instant::now());
    assert!(!sync.is_loading());
    assert_eq!(sync.rows(), ["slow"]);
    assert_eq!(store.get::<String>("pods", "prod::").unwrap().items, ["slow"]);
  }

  #[tokio::test]
  async fn test_scope_change_clears_rows_and_refetches() {
    let store = CacheStore::new();
    let key = Arc::new(Mutex::new("prod::a".to_string()));
    let key_for_sync = key.clone();
    let key_for_fetch = key.clone();

    let mut sync = ResourceSync::new(
      "pods",
      store.clone(),
      move || key_for_sync.lock().unwrap().clone(),
      move || {
        let scope = key_for_fetch.lock().unwrap().clone();
        async move { Ok(vec![format!("pod-in-{scope}")]) }
      },
    );

    sync.tick(Instant::now());
    settle(&mut sync).await;
    assert_eq!(sync.rows(), ["pod-in-prod::a"]);

    *key.lock().unwrap() = "prod::b".to_string();
    sync.tick(Instant::now());
    // Old rows dropped immediately, blocking fetch in flight
    assert!(sync.rows().is_empty());
    assert!(sync.is_loading());

    settle(&mut sync).await;
    assert_eq!(sync.rows(), ["pod-in-prod::b"]);
    assert!(store.get::<String>("pods", "prod::a").is_some());
    assert!(store.get::<String>("pods", "prod::b").is_some());
  }

  #[tokio::test]
  async fn test_delayed_refetch_fires_once_after_delay() {
    let store = CacheStore::new();
    store.put("pods", "prod::", &["seed".to_string()]);

    let calls = Arc::new(AtomicU32::new(0));
    let calls2 = calls.clone();
    let mut sync = ResourceSync::new("pods", store, fixed_key("prod::"), move || {
      let calls = calls2.clone();
      async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["post-mutation".to_string()])
      }
    })
    .with_options(SyncOptions {
      ttl: DEFAULT_TTL,
      background_refresh: false,
    });

    sync.tick(Instant::now());
    assert_eq!(sync.rows(), ["seed"]);

    sync.refetch_after(Duration::from_millis(40));
    sync.tick(Instant::now());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(60)).await;
    sync.tick(Instant::now());
    assert!(sync.is_loading());
    settle(&mut sync).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sync.rows(), ["post-mutation"]);
  }
}
