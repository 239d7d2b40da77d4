//! Repository, token, and configuration bootstrap.

use anyhow::{anyhow, bail, Context, Result};
use projects_client::{ClientConfig, ClientError, Projects};
use projects_core::{Repository, DEFAULT_HOST};
use std::process::Command;
use tracing::debug;

const NOT_AUTHENTICATED: &str = "use `gh auth login -s project` to authenticate with required scopes";
const INSUFFICIENT_SCOPES: &str = "your token has not been granted the required scopes; \
    use `gh auth refresh -s project` to authenticate with required scopes";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub repo: Option<String>,
    pub verbose: bool,
}

/// Resolve the repository and token, then connect.
///
/// # Errors
/// Returns error if there is no token for the host or no repository can be
/// determined.
pub fn open(globals: &Globals, workers: Option<usize>) -> Result<Projects> {
    let mut config = ClientConfig::load().context("Failed to load configuration")?;
    if let Some(workers) = workers {
        config = config.with_worker_count(workers);
    }

    let flagged = globals
        .repo
        .as_deref()
        .map(|r| parse_repository(r, &config.host))
        .transpose()?;

    let host = flagged
        .as_ref()
        .map_or_else(|| config.host.clone(), |r| r.host.clone());
    let token = token_for_host(&host, |key| std::env::var(key).ok())
        .or_else(|| gh_auth_token(&host))
        .ok_or_else(|| anyhow!(NOT_AUTHENTICATED))?;

    let repository = match flagged {
        Some(repository) => repository,
        None => current_repository()?,
    };
    debug!(repo = %repository, host = %repository.host, "Resolved repository");

    Projects::connect(repository, config, &token).context("Failed to create GraphQL client")
}

/// Parse `[HOST/]OWNER/REPO`; without a host the configured one is used.
pub fn parse_repository(value: &str, default_host: &str) -> Result<Repository> {
    let repository: Repository = value.parse()?;
    let has_host = value.trim().trim_matches('/').split('/').count() == 3;
    Ok(if has_host {
        repository
    } else {
        repository.with_host(default_host)
    })
}

/// Look up a token in the environment the same way `gh` does.
pub fn token_for_host(host: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let keys: &[&str] = if host.eq_ignore_ascii_case(DEFAULT_HOST) {
        &["GH_TOKEN", "GITHUB_TOKEN"]
    } else {
        &["GH_ENTERPRISE_TOKEN", "GITHUB_ENTERPRISE_TOKEN"]
    };

    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|token| !token.trim().is_empty())
}

/// Ask the `gh` CLI for its stored token.
fn gh_auth_token(host: &str) -> Option<String> {
    let output = Command::new("gh")
        .args(["auth", "token", "--hostname", host])
        .output()
        .inspect_err(|err| debug!(error = %err, "Failed to run gh"))
        .ok()?;

    if !output.status.success() {
        debug!(status = %output.status, "gh auth token failed");
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

/// The repository of the current directory's `origin` remote.
fn current_repository() -> Result<Repository> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .context("Failed to run git")?;

    if !output.status.success() {
        bail!("not a git repository with an origin remote; use --repo to select a repository");
    }

    let url = String::from_utf8_lossy(&output.stdout);
    Ok(Repository::from_remote_url(&url)?)
}

/// Replace errors that have a known remedy with that remedy.
pub fn friendly_error(err: anyhow::Error) -> anyhow::Error {
    let insufficient = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ClientError>())
        .any(|cause| cause.has_graphql_type("INSUFFICIENT_SCOPES"));

    if insufficient {
        anyhow!(INSUFFICIENT_SCOPES)
    } else {
        err
    }
}
