use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  /// Namespaces selected at startup (empty = all namespaces)
  #[serde(default)]
  pub default_namespaces: BTreeSet<String>,
  /// Custom title for the header (defaults to the cluster name if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Base URL of the cluster-management backend, e.g. http://localhost:8080/
  pub url: String,
  /// Display name for the cluster; also part of every cache key
  pub cluster: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Seconds a cached resource list is served without refetching
  #[serde(default = "default_ttl_secs")]
  pub ttl_secs: u64,
  /// Refresh stale entries in the background while showing cached data
  #[serde(default = "default_background_refresh")]
  pub background_refresh: bool,
}

fn default_ttl_secs() -> u64 {
  15
}

fn default_background_refresh() -> bool {
  true
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_secs: default_ttl_secs(),
      background_refresh: default_background_refresh(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./k9v.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/k9v/config.yaml
  /// 4. ~/.config/k9v/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/k9v/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("k9v.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("k9v").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Directory for log files, created on demand.
  pub fn log_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir()
      .ok_or_else(|| eyre!("Could not determine data directory"))?
      .join("k9v");
    std::fs::create_dir_all(&dir)
      .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
    Ok(dir)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str(
      "backend:\n  url: http://localhost:8080/\n  cluster: dev\n",
    )
    .unwrap();
    assert_eq!(config.backend.cluster, "dev");
    assert!(config.default_namespaces.is_empty());
    assert_eq!(config.cache.ttl_secs, 15);
    assert!(config.cache.background_refresh);
  }

  #[test]
  fn test_parse_full_config() {
    let config: Config = serde_yaml::from_str(
      "backend:\n  url: http://cluster.internal/\n  cluster: prod\n\
       default_namespaces:\n  - kube-system\n  - default\n\
       cache:\n  ttl_secs: 30\n  background_refresh: false\n",
    )
    .unwrap();
    assert_eq!(config.default_namespaces.len(), 2);
    assert_eq!(config.cache.ttl_secs, 30);
    assert!(!config.cache.background_refresh);
  }
}
