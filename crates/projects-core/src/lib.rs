//! projects-core: Domain models and field resolution for project boards.
//!
//! This crate provides:
//! - `Repository`: `[HOST/]OWNER/REPO` references
//! - `Project`, `ProjectItem`: board and item models as returned by the remote API
//! - `ProjectField`, `FieldValue`: the field schema and typed values ready to submit
//! - `FieldAssignments`: ordered `name=value` pairs supplied by the user

pub mod error;
pub mod field;
pub mod project;
pub mod repo;

pub use error::{CoreError, Result};
pub use field::{
    FieldAssignment, FieldAssignments, FieldDataType, FieldOption, FieldValue,
    IterationConfiguration, ProjectField, ResolvedField,
};
pub use project::{
    parse_number, Actor, Connection, ItemContent, ItemType, PageInfo, Project, ProjectItem,
    ProjectUpdate,
};
pub use repo::{Repository, DEFAULT_HOST};
