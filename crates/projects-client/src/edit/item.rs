//! The per-item pipeline: resolve the reference, attach it, apply fields.

use super::{FieldMap, ItemRef};
use crate::error::{ClientError, GraphQlError, GraphQlErrors, Result};
use crate::graphql::{execute_as, variables, GraphQlClient};
use crate::queries;
use projects_core::Repository;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Look up the content id of an issue or pull request.
///
/// # Errors
/// Returns `ClientError::ItemNotFound` if the repository has no such number.
pub async fn resolve_reference(
    client: &dyn GraphQlClient,
    repository: &Repository,
    number: u64,
) -> Result<String> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Data {
        repository: Option<RepositoryNode>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RepositoryNode {
        issue_or_pull_request: Option<Content>,
    }

    #[derive(Deserialize)]
    struct Content {
        id: String,
    }

    let result: Result<Data> = execute_as(
        client,
        queries::ISSUE_OR_PULL_REQUEST_ID,
        variables(json!({
            "owner": repository.owner,
            "name": repository.name,
            "number": number,
        })),
    )
    .await;

    match result {
        Ok(data) => data
            .repository
            .and_then(|r| r.issue_or_pull_request)
            .map(|c| c.id)
            .ok_or_else(|| not_found(number)),
        Err(ClientError::GraphQl(errors)) if errors.has_type("NOT_FOUND") => {
            Err(ClientError::ItemNotFound { number, errors })
        }
        Err(err) => Err(err),
    }
}

fn not_found(number: u64) -> ClientError {
    ClientError::ItemNotFound {
        number,
        errors: GraphQlErrors(vec![GraphQlError::new(
            Some("NOT_FOUND"),
            format!("Could not resolve to an issue or pull request with the number of {number}."),
        )]),
    }
}

/// Attach content to a board and return the new item id.
///
/// The same content attached twice is not deduplicated here.
///
/// # Errors
/// Returns remote errors as is.
pub async fn attach(client: &dyn GraphQlClient, board_id: &str, content_id: &str) -> Result<String> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Data {
        add_project_v2_item_by_id: Added,
    }

    #[derive(Deserialize)]
    struct Added {
        item: Item,
    }

    #[derive(Deserialize)]
    struct Item {
        id: String,
    }

    let data: Data = execute_as(
        client,
        queries::ADD_ITEM,
        variables(json!({ "id": board_id, "contentId": content_id })),
    )
    .await?;

    Ok(data.add_project_v2_item_by_id.item.id)
}

/// Set every resolved field on an item, one mutation per field.
///
/// Stops at the first failure; fields after it are not attempted.
///
/// # Errors
/// Returns `ClientError::FieldUpdate` naming the field that failed.
pub async fn apply_fields(
    client: &dyn GraphQlClient,
    board_id: &str,
    item_id: &str,
    fields: &FieldMap,
) -> Result<()> {
    for field in fields.values() {
        let vars = variables(json!({
            "projectId": board_id,
            "itemId": item_id,
            "fieldId": field.id,
            "value": field.value,
        }));

        client
            .execute(queries::UPDATE_ITEM_FIELD, vars)
            .await
            .map_err(|source| ClientError::FieldUpdate {
                name: field.name.clone(),
                source: Box::new(source),
            })?;

        debug!(item_id, field = %field.name, "Updated field");
    }

    Ok(())
}

/// Shared inputs for running work units against one board.
#[derive(Clone, Copy)]
pub struct ItemContext<'a> {
    pub client: &'a dyn GraphQlClient,
    pub repository: &'a Repository,
    pub board_id: &'a str,
    pub fields: &'a FieldMap,
}

/// Where a work unit is in the pipeline.
#[derive(Debug)]
pub enum WorkState {
    Pending,
    ReferenceResolved { content_id: String },
    Attached { item_id: String },
    FieldsApplied { item_id: String },
    Failed(ClientError),
}

impl WorkState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ReferenceResolved { .. } => "reference-resolved",
            Self::Attached { .. } => "attached",
            Self::FieldsApplied { .. } => "fields-applied",
            Self::Failed(_) => "failed",
        }
    }
}

/// One issue or pull request number on its way onto the board.
///
/// Stages run strictly in order and none is retried.
#[derive(Debug)]
pub struct WorkUnit {
    number: u64,
    state: WorkState,
}

impl WorkUnit {
    #[must_use]
    pub const fn new(number: u64) -> Self {
        Self {
            number,
            state: WorkState::Pending,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &WorkState {
        &self.state
    }

    /// Run the next stage. Terminal states are left as they are.
    pub async fn advance(self, ctx: ItemContext<'_>) -> Self {
        let number = self.number;
        let state = match self.state {
            WorkState::Pending => match resolve_reference(ctx.client, ctx.repository, number).await {
                Ok(content_id) => WorkState::ReferenceResolved { content_id },
                Err(err) => WorkState::Failed(err),
            },
            WorkState::ReferenceResolved { content_id } => {
                match attach(ctx.client, ctx.board_id, &content_id).await {
                    Ok(item_id) => WorkState::Attached { item_id },
                    Err(err) => WorkState::Failed(err),
                }
            }
            WorkState::Attached { item_id } => {
                match apply_fields(ctx.client, ctx.board_id, &item_id, ctx.fields).await {
                    Ok(()) => WorkState::FieldsApplied { item_id },
                    Err(err) => WorkState::Failed(err),
                }
            }
            terminal => terminal,
        };

        debug!(number, state = state.name(), "Work unit advanced");
        Self { number, state }
    }

    /// Advance until done.
    ///
    /// # Errors
    /// Returns the error of the stage that failed.
    pub async fn run(mut self, ctx: ItemContext<'_>) -> Result<ItemRef> {
        loop {
            match self.state {
                WorkState::FieldsApplied { item_id } => {
                    return Ok(ItemRef {
                        number: self.number,
                        item_id,
                    });
                }
                WorkState::Failed(err) => return Err(err),
                _ => self = self.advance(ctx).await,
            }
        }
    }
}
