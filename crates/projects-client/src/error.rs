//! Error types for the remote client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// Structured error code, e.g. `NOT_FOUND`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub message: String,
}

impl GraphQlError {
    #[must_use]
    pub fn new(error_type: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.map(String::from),
            message: message.into(),
        }
    }
}

/// Errors reported by the remote API in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlErrors(pub Vec<GraphQlError>);

impl GraphQlErrors {
    /// Check whether any error carries the given code.
    #[must_use]
    pub fn has_type(&self, code: &str) -> bool {
        self.0
            .iter()
            .any(|e| e.error_type.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(code)))
    }
}

impl fmt::Display for GraphQlErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        write!(f, "GraphQL: {}", messages.join(", "))
    }
}

impl std::error::Error for GraphQlErrors {}

/// Errors that can occur talking to the remote API or editing a board.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input or field resolution error.
    #[error(transparent)]
    Core(#[from] projects_core::CoreError),

    /// The remote API returned errors.
    #[error(transparent)]
    GraphQl(#[from] GraphQlErrors),

    /// The request could not be sent or the response not read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A response did not have the expected shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An issue or pull request number does not exist in the repository.
    #[error("{errors}")]
    ItemNotFound { number: u64, errors: GraphQlErrors },

    /// A removal target is not on the board.
    #[error("project does not reference #{0}")]
    ItemNotReferenced(u64),

    /// Updating one field of an item failed.
    #[error("failed to update field {name:?}: {source}")]
    FieldUpdate {
        name: String,
        #[source]
        source: Box<ClientError>,
    },

    /// The board exists on neither the repository nor its owner.
    #[error("project #{number} not found for {owner_type} {owner:?}")]
    ProjectNotFound {
        number: u32,
        owner_type: String,
        owner: String,
    },

    /// An owner board could not be linked to the repository.
    #[error("failed to link project #{number} to {repo:?}: {source}")]
    LinkFailed {
        number: u32,
        repo: String,
        #[source]
        source: Box<ClientError>,
    },

    /// The request is inconsistent, e.g. fields without items to add.
    #[error("{0}")]
    InvalidRequest(String),

    /// A worker task panicked or was aborted.
    #[error("worker failed: {0}")]
    WorkerFailed(String),

    /// Configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ClientError {
    /// The remote errors behind this error, looking through wrappers.
    #[must_use]
    pub fn graphql_errors(&self) -> Option<&GraphQlErrors> {
        match self {
            Self::GraphQl(errors) | Self::ItemNotFound { errors, .. } => Some(errors),
            Self::FieldUpdate { source, .. } | Self::LinkFailed { source, .. } => {
                source.graphql_errors()
            }
            _ => None,
        }
    }

    /// Check whether the remote reported the given error code.
    #[must_use]
    pub fn has_graphql_type(&self, code: &str) -> bool {
        self.graphql_errors().is_some_and(|e| e.has_type(code))
    }
}
