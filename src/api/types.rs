//! Row types returned by the cluster-management backend.

use serde::{Deserialize, Serialize};

use crate::deeplink::DeepLinkTarget;
use crate::select::RowKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
  pub name: String,
  pub namespace: String,
  pub status: String,
  /// Ready containers, e.g. "2/2".
  pub ready: String,
  #[serde(default)]
  pub restarts: u32,
  #[serde(default)]
  pub age: String,
  #[serde(default)]
  pub node: String,
  #[serde(default)]
  pub containers: Vec<String>,
  #[serde(default)]
  pub ip: Option<String>,
}

impl Pod {
  /// Synthetic stand-in for a pod that is not (or no longer) in view, used
  /// by the deep-link fallback path.
  pub fn placeholder(name: &str, namespace: &str) -> Self {
    Self {
      name: name.to_string(),
      namespace: namespace.to_string(),
      status: "Unknown".to_string(),
      ready: "0/0".to_string(),
      restarts: 0,
      age: "Unknown".to_string(),
      node: "Unknown".to_string(),
      containers: Vec::new(),
      ip: None,
    }
  }
}

impl RowKey for Pod {
  fn row_key(&self) -> String {
    format!("{}/{}", self.namespace, self.name)
  }
}

impl DeepLinkTarget for Pod {
  fn matches(&self, name: &str, namespace: &str) -> bool {
    self.name == name && self.namespace == namespace
  }

  fn placeholder(name: &str, namespace: &str) -> Self {
    Pod::placeholder(name, namespace)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
  pub name: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub age: String,
}

impl RowKey for Namespace {
  fn row_key(&self) -> String {
    self.name.clone()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
  pub name: String,
  pub namespace: String,
  /// "True" once the certificate has been issued.
  #[serde(default)]
  pub ready: String,
  #[serde(default)]
  pub issuer: String,
  #[serde(default)]
  pub secret_name: String,
  /// Not-after timestamp as reported by the backend.
  #[serde(default)]
  pub expires: String,
  #[serde(default)]
  pub age: String,
}

impl RowKey for Certificate {
  fn row_key(&self) -> String {
    format!("{}/{}", self.namespace, self.name)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisruptionBudget {
  pub name: String,
  pub namespace: String,
  #[serde(default)]
  pub min_available: String,
  #[serde(default)]
  pub max_unavailable: String,
  #[serde(default)]
  pub allowed_disruptions: u32,
  #[serde(default)]
  pub current_healthy: u32,
  #[serde(default)]
  pub desired_healthy: u32,
  /// Names of pods covered by this budget's selector
  #[serde(default)]
  pub pods: Vec<String>,
  #[serde(default)]
  pub age: String,
}

impl RowKey for DisruptionBudget {
  fn row_key(&self) -> String {
    format!("{}/{}", self.namespace, self.name)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaim {
  pub name: String,
  pub namespace: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub volume: String,
  #[serde(default)]
  pub capacity: String,
  #[serde(default)]
  pub access_modes: Vec<String>,
  #[serde(default)]
  pub storage_class: String,
  /// Pod currently mounting this claim, if any
  #[serde(default)]
  pub mounted_by: Option<String>,
  #[serde(default)]
  pub age: String,
}

impl RowKey for VolumeClaim {
  fn row_key(&self) -> String {
    format!("{}/{}", self.namespace, self.name)
  }
}

/// Point-in-time usage sample for one pod, from the metrics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodMetrics {
  pub name: String,
  pub namespace: String,
  #[serde(default)]
  pub cpu: String,
  #[serde(default)]
  pub memory: String,
}
