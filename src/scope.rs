//! Active filter scope: which cluster and namespaces the views are looking at.
//!
//! The scope is owned by the app and handed to each view as a read-only
//! accessor. The cache key is a pure function of the scope, so identical
//! filter state always resolves to the identical key and the sync engine
//! never has to reach into app globals.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ScopeState {
  cluster: String,
  namespaces: BTreeSet<String>,
}

/// Shared handle to the active cluster/namespace filter.
#[derive(Clone, Default)]
pub struct Scope {
  state: Arc<Mutex<ScopeState>>,
}

impl Scope {
  pub fn new(cluster: impl Into<String>, namespaces: impl IntoIterator<Item = String>) -> Self {
    Self {
      state: Arc::new(Mutex::new(ScopeState {
        cluster: cluster.into(),
        namespaces: namespaces.into_iter().collect(),
      })),
    }
  }

  /// Replace the namespace filter. An empty set means "all namespaces".
  pub fn set_namespaces(&self, namespaces: impl IntoIterator<Item = String>) {
    let mut state = self.lock();
    state.namespaces = namespaces.into_iter().collect();
  }

  pub fn clear_namespaces(&self) {
    self.lock().namespaces.clear();
  }

  pub fn namespaces(&self) -> Vec<String> {
    self.lock().namespaces.iter().cloned().collect()
  }

  pub fn cluster(&self) -> String {
    self.lock().cluster.clone()
  }

  /// Cache key for the current scope: `cluster::ns1,ns2` with namespaces
  /// sorted. BTreeSet keeps the ordering stable for us.
  pub fn cache_key(&self) -> String {
    let state = self.lock();
    let namespaces: Vec<&str> = state.namespaces.iter().map(String::as_str).collect();
    format!("{}::{}", state.cluster, namespaces.join(","))
  }

  /// Short human label for the header, e.g. `default,kube-system` or `all`.
  pub fn label(&self) -> String {
    let state = self.lock();
    if state.namespaces.is_empty() {
      "all".to_string()
    } else {
      let namespaces: Vec<&str> = state.namespaces.iter().map(String::as_str).collect();
      namespaces.join(",")
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, ScopeState> {
    // The lock is only held for short synchronous reads/writes on the UI
    // task; a poisoned mutex here means a panic already tore the app down.
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }
}
