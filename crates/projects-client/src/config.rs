//! Client configuration.

use crate::error::{ClientError, Result};
use projects_core::DEFAULT_HOST;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of concurrent workers used when adding items.
pub const DEFAULT_WORKER_COUNT: usize = 5;
/// Page size for paginated queries.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "GH_PROJECTS_CONFIG";
/// Environment variable overriding the host.
pub const HOST_ENV: &str = "GH_HOST";
/// Environment variable overriding the GraphQL endpoint.
pub const API_URL_ENV: &str = "GH_PROJECTS_API_URL";

/// Configuration stored in `<config dir>/gh-projects/config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host used when the repository reference does not name one.
    #[serde(default = "default_host")]
    pub host: String,

    /// Explicit GraphQL endpoint, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Concurrent workers used when adding items.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Page size for paginated queries.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

const fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_url: None,
            worker_count: DEFAULT_WORKER_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Where the config file is looked for.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("gh-projects").join("config.yml"))
    }

    /// Load the config file if present, then apply environment overrides.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Load a config file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ClientError::Config {
            path: path.to_path_buf(),
            source,
        })?;

        // An empty file is an empty mapping.
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)?
        };

        debug!(path = %path.display(), "Loaded config");

        Ok(config.normalized())
    }

    /// Apply overrides looked up by environment variable name.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.is_empty()) {
            self.api_url = Some(url);
        }
        self.normalized()
    }

    /// Override the worker count.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self.normalized()
    }

    /// GraphQL endpoint for `host`, unless `api_url` is set.
    #[must_use]
    pub fn graphql_endpoint(&self, host: &str) -> String {
        if let Some(url) = &self.api_url {
            return url.clone();
        }
        if host.eq_ignore_ascii_case(DEFAULT_HOST) {
            "https://api.github.com/graphql".to_string()
        } else {
            format!("https://{host}/api/graphql")
        }
    }

    fn normalized(mut self) -> Self {
        self.worker_count = self.worker_count.max(1);
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self
    }
}
