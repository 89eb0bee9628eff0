//! Explorer configuration.
//!
//! Resolved in layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. YAML file named by `CBM_EXPLORER_CONFIG` (optional)
//! 3. environment (`CBM_SITE_BASE`, `CBM_ARTIFACTS_BASE`,
//!    `CBM_FETCH_TIMEOUT_SECS`), with `.env` loaded first
//! 4. command-line flags (native binary only, applied by the caller)
//!
//! In the browser none of this runs; [`ExplorerConfig::for_mount`] builds the
//! config from the page origin and the mount element's data attribute.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::{ExplorerError, Result};

pub const CONFIG_PATH_ENV: &str = "CBM_EXPLORER_CONFIG";
pub const SITE_BASE_ENV: &str = "CBM_SITE_BASE";
pub const ARTIFACTS_BASE_ENV: &str = "CBM_ARTIFACTS_BASE";
pub const FETCH_TIMEOUT_ENV: &str = "CBM_FETCH_TIMEOUT_SECS";

pub const DEFAULT_SITE_BASE: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_ARTIFACTS_BASE: &str = "_artifacts";
pub const DEFAULT_SEARCH_INDEX_PATH: &str = "search/search_index.json";

/// Host element the explorer mounts on.
pub const MOUNT_ELEMENT_ID: &str = "cbm-explorer";
/// Data attribute on the mount element carrying the artifacts base.
pub const ARTIFACTS_BASE_ATTR: &str = "data-artifacts-base";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Documentation site root: an `http(s)` URL or, natively, a directory.
    pub site_base: String,
    /// Artifact directory relative to `site_base`.
    pub artifacts_base: String,
    /// Documentation search index relative to `site_base`.
    pub search_index_path: String,
    /// Per-request timeout for HTTP fetches. `None` waits indefinitely.
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            site_base: DEFAULT_SITE_BASE.to_string(),
            artifacts_base: DEFAULT_ARTIFACTS_BASE.to_string(),
            search_index_path: DEFAULT_SEARCH_INDEX_PATH.to_string(),
            fetch_timeout_secs: None,
        }
    }
}

impl ExplorerConfig {
    /// Defaults, then the optional YAML file, then the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`ExplorerConfig::load`], but an explicit `path` takes precedence
    /// over `CBM_EXPLORER_CONFIG`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match std::env::var(CONFIG_PATH_ENV) {
                Ok(path) => Self::from_file(&path)?,
                Err(_) => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "configuration resolved");
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExplorerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ExplorerError::Config(e.to_string()))
    }

    /// Overlay environment values. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(SITE_BASE_ENV).filter(|v| !v.is_empty()) {
            self.site_base = v;
        }
        if let Some(v) = lookup(ARTIFACTS_BASE_ENV).filter(|v| !v.is_empty()) {
            self.artifacts_base = v;
        }
        if let Some(v) = lookup(FETCH_TIMEOUT_ENV).filter(|v| !v.is_empty()) {
            let secs = v.trim().parse::<u64>().map_err(|_| {
                ExplorerError::Config(format!("{FETCH_TIMEOUT_ENV} must be whole seconds, got '{v}'"))
            })?;
            self.fetch_timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Browser config: site root is the page origin, artifacts base comes from
    /// the mount element (default `_artifacts`).
    pub fn for_mount(origin: &str, artifacts_base: Option<String>) -> Self {
        Self {
            site_base: format!("{}/", origin.trim_end_matches('/')),
            artifacts_base: artifacts_base
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_ARTIFACTS_BASE.to_string()),
            ..Self::default()
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    /// Whether artifacts are fetched over HTTP (as opposed to a directory).
    pub fn is_remote(&self) -> bool {
        self.site_base.starts_with("http://") || self.site_base.starts_with("https://")
    }

    /// Site root as a URL with a trailing slash, so relative joins append.
    pub fn site_url(&self) -> Result<Url> {
        if self.is_remote() {
            let mut base = self.site_base.clone();
            if !base.ends_with('/') {
                base.push('/');
            }
            return Url::parse(&base)
                .map_err(|e| ExplorerError::Config(format!("invalid site base '{base}': {e}")));
        }
        self.directory_url()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn directory_url(&self) -> Result<Url> {
        let dir = std::path::absolute(&self.site_base)?;
        Url::from_directory_path(&dir)
            .map_err(|_| ExplorerError::Config(format!("invalid site directory '{}'", dir.display())))
    }

    #[cfg(target_arch = "wasm32")]
    fn directory_url(&self) -> Result<Url> {
        Err(ExplorerError::Config(format!(
            "site base must be an http(s) URL in the browser, got '{}'",
            self.site_base
        )))
    }

    /// Artifacts base with exactly one trailing slash.
    pub fn artifacts_prefix(&self) -> String {
        let trimmed = self.artifacts_base.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let c = ExplorerConfig::default();
        assert_eq!(c.artifacts_base, "_artifacts");
        assert_eq!(c.search_index_path, "search/search_index.json");
        assert!(c.is_remote());
        assert_eq!(c.fetch_timeout(), None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let c = ExplorerConfig::from_yaml("artifacts_base: generated\nfetch_timeout_secs: 5\n").unwrap();
        assert_eq!(c.artifacts_base, "generated");
        assert_eq!(c.fetch_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(c.site_base, DEFAULT_SITE_BASE);
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = ExplorerConfig::from_yaml("fetch_timeout_secs: soon").unwrap_err();
        assert_eq!(err.code(), "CONFIG");
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            (SITE_BASE_ENV, "https://docs.example.org/map"),
            (FETCH_TIMEOUT_ENV, "10"),
            (ARTIFACTS_BASE_ENV, ""),
        ]);
        let mut c = ExplorerConfig::default();
        c.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.site_base, "https://docs.example.org/map");
        assert_eq!(c.artifacts_base, "_artifacts");
        assert_eq!(c.fetch_timeout_secs, Some(10));
        assert_eq!(c.site_url().unwrap().as_str(), "https://docs.example.org/map/");
    }

    #[test]
    fn test_env_rejects_bad_timeout() {
        let mut c = ExplorerConfig::default();
        let err = c.apply_env(|k| (k == FETCH_TIMEOUT_ENV).then(|| "ten".to_string())).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_for_mount() {
        let c = ExplorerConfig::for_mount("http://localhost:8000", None);
        assert_eq!(c.site_base, "http://localhost:8000/");
        assert_eq!(c.artifacts_base, "_artifacts");
        let c = ExplorerConfig::for_mount("http://localhost:8000/", Some("/custom/".into()));
        assert_eq!(c.artifacts_prefix(), "custom/");
    }

    #[test]
    fn test_directory_site_url() {
        let dir = tempfile::tempdir().unwrap();
        let c = ExplorerConfig {
            site_base: dir.path().display().to_string(),
            ..ExplorerConfig::default()
        };
        assert!(!c.is_remote());
        let url = c.site_url().unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.as_str().ends_with('/'));
    }
}
