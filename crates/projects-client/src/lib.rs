//! projects-client: Remote board operations for gh-projects.
//!
//! This crate provides:
//! - `GraphQlClient`: the port every remote call goes through
//! - `HttpTransport`: a `GraphQlClient` over HTTPS with a bearer token
//! - `Projects`: find, list, view, clone, and edit boards of one repository
//! - `edit`: the concurrent item-adding pool and sequential removals
//! - `ClientConfig`: host, endpoint, and worker settings

pub mod config;
pub mod edit;
pub mod error;
pub mod graphql;
pub mod http;
pub mod projects;
pub mod queries;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ClientConfig, DEFAULT_PAGE_SIZE, DEFAULT_WORKER_COUNT};
pub use edit::{Board, EditOutcome, EditRequest, FieldMap, ItemRef};
pub use error::{ClientError, GraphQlError, GraphQlErrors, Result};
pub use graphql::{GraphQlClient, Variables};
pub use http::HttpTransport;
pub use projects::{CloneOptions, ProjectRef, Projects, StateFilter};
