use crate::api::types::{
  Certificate, DisruptionBudget, Namespace, Pod, PodMetrics, VolumeClaim,
};
use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Client for the cluster-management backend REST API
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base = Url::parse(&config.backend.url)
      .map_err(|e| eyre!("Invalid backend URL {}: {}", config.backend.url, e))?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  /// List all namespaces in the cluster
  pub async fn get_namespaces(&self) -> Result<Vec<Namespace>> {
    self.get_json("api/namespaces", &[]).await
  }

  /// Get pods across the given namespaces (all namespaces when empty)
  pub async fn get_pods(&self, namespaces: &[String]) -> Result<Vec<Pod>> {
    self.get_scoped("api/pods", namespaces).await
  }

  /// Get cert-manager certificates across the given namespaces
  pub async fn get_certificates(&self, namespaces: &[String]) -> Result<Vec<Certificate>> {
    self.get_scoped("api/certificates", namespaces).await
  }

  /// Get pod disruption budgets across the given namespaces
  pub async fn get_disruption_budgets(
    &self,
    namespaces: &[String],
  ) -> Result<Vec<DisruptionBudget>> {
    self.get_scoped("api/poddisruptionbudgets", namespaces).await
  }

  /// Get persistent volume claims across the given namespaces
  pub async fn get_volume_claims(&self, namespaces: &[String]) -> Result<Vec<VolumeClaim>> {
    self.get_scoped("api/persistentvolumeclaims", namespaces).await
  }

  /// Get current usage samples for all pods the metrics server knows about
  pub async fn get_pod_metrics(&self) -> Result<Vec<PodMetrics>> {
    self.get_json("api/metrics/pods", &[]).await
  }

  /// Fetch recent log lines for one pod
  pub async fn get_pod_logs(&self, namespace: &str, name: &str, tail: u32) -> Result<String> {
    let url = self.endpoint("api/pods/logs")?;
    let tail = tail.to_string();

    let response = self
      .http
      .get(url)
      .query(&[("namespace", namespace), ("name", name), ("tail", &tail)])
      .send()
      .await
      .map_err(|e| eyre!("Failed to get logs for {}/{}: {}", namespace, name, e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to get logs for {}/{}: {}", namespace, name, e))?;

    response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read logs for {}/{}: {}", namespace, name, e))
  }

  /// Delete a pod
  pub async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()> {
    let url = self.endpoint("api/pods")?;

    self
      .http
      .delete(url)
      .query(&[("namespace", namespace), ("name", name)])
      .send()
      .await
      .map_err(|e| eyre!("Failed to delete pod {}/{}: {}", namespace, name, e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to delete pod {}/{}: {}", namespace, name, e))?;

    Ok(())
  }

  /// Restart a pod by rolling its owning workload
  pub async fn restart_pod(&self, namespace: &str, name: &str) -> Result<()> {
    let url = self.endpoint("api/pods/restart")?;

    self
      .http
      .post(url)
      .query(&[("namespace", namespace), ("name", name)])
      .send()
      .await
      .map_err(|e| eyre!("Failed to restart pod {}/{}: {}", namespace, name, e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to restart pod {}/{}: {}", namespace, name, e))?;

    Ok(())
  }

  /// Fan a namespaced list endpoint out over the selected namespaces and
  /// flatten the results. Any single failure fails the whole fetch.
  async fn get_scoped<T: DeserializeOwned>(
    &self,
    path: &str,
    namespaces: &[String],
  ) -> Result<Vec<T>> {
    if namespaces.is_empty() {
      return self.get_json(path, &[]).await;
    }

    let fetches = namespaces
      .iter()
      .map(|ns| async move { self.get_json::<Vec<T>>(path, &[("namespace", ns)]).await });

    let lists = try_join_all(fetches).await?;
    Ok(lists.into_iter().flatten().collect())
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
    let url = self.endpoint(path)?;

    let response = self
      .http
      .get(url)
      .query(query)
      .send()
      .await
      .map_err(|e| eyre!("Failed to fetch {}: {}", path, e))?
      .error_for_status()
      .map_err(|e| eyre!("Failed to fetch {}: {}", path, e))?;

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse {} response: {}", path, e))
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))
  }
}
