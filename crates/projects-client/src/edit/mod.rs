//! Bulk item editing.
//!
//! Adding items runs one [`WorkUnit`](item::WorkUnit) per issue or pull request number
//! across a bounded pool of workers (see [`pool`]). Field assignments are
//! resolved against the board's schema once, before any worker starts, and the
//! resulting [`FieldMap`] is shared read-only. Removals are validated up front
//! and then issued one at a time in the order given.

pub mod fields;
pub mod item;
pub mod pool;
pub mod removal;

use projects_core::{FieldAssignments, ProjectUpdate, Repository, ResolvedField};
use serde::Serialize;
use std::collections::HashMap;

pub use fields::resolve_fields;
pub use item::{apply_fields, attach, resolve_reference};
pub use pool::add_items;
pub use removal::remove_items;

/// Resolved fields keyed by the name the user wrote.
///
/// Iteration order is unspecified; nothing may depend on the order fields are
/// applied in.
pub type FieldMap = HashMap<String, ResolvedField>;

/// The board an edit applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub repository: Repository,
    pub number: u32,
    /// Remote board id.
    pub id: String,
}

impl Board {
    #[must_use]
    pub fn new(repository: Repository, number: u32, id: impl Into<String>) -> Self {
        Self {
            repository,
            number,
            id: id.into(),
        }
    }
}

/// An issue or pull request number and the board item wrapping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRef {
    pub number: u64,
    pub item_id: String,
}

/// Everything an edit should change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRequest {
    pub number: u32,
    pub update: ProjectUpdate,
    /// Issue or pull request numbers to add, in the order given.
    pub add: Vec<u64>,
    /// Issue or pull request numbers to remove, in the order given.
    pub remove: Vec<u64>,
    /// Applied to every added item; only valid when `add` is non-empty.
    pub fields: FieldAssignments,
}

impl EditRequest {
    /// Create a request that edits board `number`.
    #[must_use]
    pub fn new(number: u32) -> Self {
        Self {
            number,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_update(mut self, update: ProjectUpdate) -> Self {
        self.update = update;
        self
    }

    #[must_use]
    pub fn with_add(mut self, numbers: impl IntoIterator<Item = u64>) -> Self {
        self.add.extend(numbers);
        self
    }

    #[must_use]
    pub fn with_remove(mut self, numbers: impl IntoIterator<Item = u64>) -> Self {
        self.remove.extend(numbers);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: FieldAssignments) -> Self {
        self.fields = fields;
        self
    }
}

/// What an edit changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub url: String,
    /// Whether scalar properties were sent.
    pub updated: bool,
    pub added: Vec<ItemRef>,
    pub removed: Vec<ItemRef>,
}
