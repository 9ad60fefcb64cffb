//! In-memory resource cache shared by every mounted view.
//!
//! Entries are keyed by `(resource_type, cache_key)` where the cache key
//! encodes the filter scope the list was fetched under. Lists are stored as
//! `serde_json::Value` so a single store instance serves every resource
//! type. Entries live for the process session; the only eviction is
//! overwrite-on-refresh.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One cached list and the moment it was written.
#[derive(Debug, Clone)]
struct CacheEntry {
  data: serde_json::Value,
  last_updated: DateTime<Utc>,
}

/// A cache hit, deserialized back into row types.
#[derive(Debug, Clone)]
pub struct CachedList<T> {
  pub items: Vec<T>,
  pub last_updated: DateTime<Utc>,
}

/// Process-wide keyed store of fetched resource lists.
///
/// Writes happen only from the UI task when a sync engine applies a
/// completed fetch, so there is no contention to speak of; the mutex exists
/// because fetch futures must be `Send` and the handle crosses task spawns.
#[derive(Clone, Default)]
pub struct CacheStore {
  entries: Arc<Mutex<HashMap<(String, String), CacheEntry>>>,
}

impl CacheStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Look up the cached list for `(resource_type, cache_key)`.
  ///
  /// Returns `None` on a miss or if the stored payload no longer
  /// deserializes into `T` (which would mean two types share a resource
  /// type name - a programming error we treat as a miss rather than a
  /// crash).
  pub fn get<T: DeserializeOwned>(&self, resource_type: &str, cache_key: &str) -> Option<CachedList<T>> {
    let entries = self.lock();
    let entry = entries.get(&(resource_type.to_string(), cache_key.to_string()))?;
    let items: Vec<T> = serde_json::from_value(entry.data.clone()).ok()?;
    Some(CachedList {
      items,
      last_updated: entry.last_updated,
    })
  }

  /// Store a freshly fetched list. The whole entry is replaced in one
  /// assignment, so readers never observe a partial write.
  pub fn put<T: Serialize>(&self, resource_type: &str, cache_key: &str, items: &[T]) {
    let data = match serde_json::to_value(items) {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!(resource_type, error = %e, "failed to serialize cache entry");
        return;
      }
    };

    let mut entries = self.lock();
    let key = (resource_type.to_string(), cache_key.to_string());
    // last_updated never moves backwards for a key, even if the wall clock does
    let now = Utc::now();
    let last_updated = match entries.get(&key) {
      Some(prev) if prev.last_updated > now => prev.last_updated,
      _ => now,
    };
    entries.insert(key, CacheEntry { data, last_updated });
  }

  /// Age of the entry for `(resource_type, cache_key)`, if present.
  pub fn age(&self, resource_type: &str, cache_key: &str) -> Option<Duration> {
    let entries = self.lock();
    let entry = entries.get(&(resource_type.to_string(), cache_key.to_string()))?;
    Some(Utc::now() - entry.last_updated)
  }

  /// Backdate an entry so staleness paths can be exercised without sleeping.
  #[cfg(test)]
  pub fn backdate(&self, resource_type: &str, cache_key: &str, by: Duration) {
    let mut entries = self.lock();
    if let Some(entry) = entries.get_mut(&(resource_type.to_string(), cache_key.to_string())) {
      entry.last_updated -= by;
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), CacheEntry>> {
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }
}
