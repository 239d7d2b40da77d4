//! Repository references.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host used when a reference does not name one.
pub const DEFAULT_HOST: &str = "github.com";

/// A repository on a host, e.g. `github.com/heaths/gh-projects`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repository {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Create a repository reference on the default host.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Parse a git remote URL.
    ///
    /// Supports `https://host/owner/repo(.git)`, `ssh://git@host/owner/repo(.git)`,
    /// and scp-like `git@host:owner/repo(.git)`.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidRepository` if the URL has no owner and name.
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let url = url.trim();
        let invalid = || CoreError::InvalidRepository(url.to_string());

        let rest = if let Some((_, rest)) = url.split_once("://") {
            // Drop any user info.
            rest.rsplit_once('@').map_or(rest, |(_, host_path)| host_path)
        } else if let Some((user_host, path)) = url.split_once(':') {
            let host = user_host.rsplit_once('@').map_or(user_host, |(_, h)| h);
            return format!("{host}/{path}").parse().map_err(|_| invalid());
        } else {
            return Err(invalid());
        };

        rest.parse().map_err(|_| invalid())
    }
}

impl FromStr for Repository {
    type Err = CoreError;

    /// Parse `OWNER/REPO` or `HOST/OWNER/REPO`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let parts: Vec<&str> = trimmed.split('/').collect();

        if parts.iter().any(|p| p.is_empty()) {
            return Err(CoreError::InvalidRepository(s.to_string()));
        }

        match parts.as_slice() {
            [owner, name] => Ok(Self::new(*owner, *name)),
            [host, owner, name] => Ok(Self::new(*owner, *name).with_host(host.to_lowercase())),
            _ => Err(CoreError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
