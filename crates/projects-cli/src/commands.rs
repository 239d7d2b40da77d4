//! CLI command implementations.

use crate::output::{pluralize, OutputFormat, Printer};
use crate::session::{self, Globals};
use anyhow::{Context, Result};
use projects_client::{CloneOptions, EditRequest, StateFilter};
use projects_core::{FieldAssignments, ProjectUpdate};
use std::io::Read;
use tracing::debug;

/// Scalar properties as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `-` reads the body from stdin.
    pub body: Option<String>,
    pub public: Option<bool>,
}

impl Properties {
    fn into_update(self) -> Result<ProjectUpdate> {
        let body = match self.body.as_deref() {
            Some("-") => Some(read_stdin()?),
            _ => self.body,
        };

        Ok(ProjectUpdate {
            title: self.title,
            description: self.description,
            body,
            public: self.public,
        })
    }
}

fn read_stdin() -> Result<String> {
    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .context("Failed to read body from stdin")?;
    Ok(body)
}

/// List projects.
pub fn list(
    globals: &Globals,
    search: Option<&str>,
    state: StateFilter,
    format: OutputFormat,
) -> Result<()> {
    let projects = session::open(globals, None)?;
    let printer = Printer::new(format, globals.verbose);

    let rt = tokio::runtime::Runtime::new()?;
    let list = rt.block_on(projects.list_projects(search, state))?;

    printer.print(list.as_slice())
}

/// View a project.
pub fn view(globals: &Globals, number: u32, format: OutputFormat) -> Result<()> {
    let projects = session::open(globals, None)?;
    let printer = Printer::new(format, globals.verbose);

    let rt = tokio::runtime::Runtime::new()?;
    let project = rt.block_on(projects.view_project(number))?;

    printer.print(&project)
}

/// Clone a project.
pub fn clone(
    globals: &Globals,
    number: u32,
    title: String,
    drafts: bool,
    properties: Properties,
    format: OutputFormat,
) -> Result<()> {
    let options = CloneOptions {
        number,
        title,
        drafts,
        update: properties.into_update()?,
    };

    let projects = session::open(globals, None)?;
    let printer = Printer::new(format, globals.verbose);

    let rt = tokio::runtime::Runtime::new()?;
    let cloned = rt.block_on(projects.clone_project(&options))?;

    printer.print(&cloned)
}

/// Item changes as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub add: Vec<u64>,
    pub remove: Vec<u64>,
    /// `name=value` assignments.
    pub fields: Vec<String>,
    pub workers: Option<usize>,
}

/// Edit a project.
pub fn edit(
    globals: &Globals,
    number: u32,
    properties: Properties,
    changes: ItemChanges,
    format: OutputFormat,
) -> Result<()> {
    let fields = FieldAssignments::parse_all(&changes.fields)?;
    let request = EditRequest::new(number)
        .with_update(properties.into_update()?)
        .with_add(changes.add)
        .with_remove(changes.remove)
        .with_fields(fields);
    debug!(
        number,
        add = request.add.len(),
        remove = request.remove.len(),
        fields = request.fields.len(),
        "Editing project"
    );

    let projects = session::open(globals, changes.workers)?;
    let printer = Printer::new(format, globals.verbose);

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(projects.edit(&request))?;

    if !outcome.added.is_empty() {
        printer.status(&format!("Added {}", pluralize(outcome.added.len(), "issue")));
    }
    if !outcome.removed.is_empty() {
        printer.status(&format!("Removed {}", pluralize(outcome.removed.len(), "issue")));
    }

    printer.print(&outcome)
}
