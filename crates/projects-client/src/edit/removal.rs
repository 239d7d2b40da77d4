//! Removing items by issue or pull request number.

use super::{Board, ItemRef};
use crate::error::{ClientError, Result};
use crate::graphql::{execute_as, variables, GraphQlClient};
use crate::queries;
use projects_core::{Connection, ProjectItem};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

#[derive(Deserialize)]
struct Data {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    #[serde(rename = "projectV2")]
    project: Option<ProjectNode>,
}

#[derive(Deserialize)]
struct ProjectNode {
    #[serde(default)]
    items: Connection<ProjectItem>,
}

/// Remove the items wrapping `numbers` from the board.
///
/// Every page of the board's items is read first. If any number is not on the
/// board nothing is removed; otherwise items are deleted one at a time in the
/// order given.
///
/// # Errors
/// Returns `ClientError::ItemNotReferenced` for the first number not on the
/// board, or the first remote error.
pub async fn remove_items(
    client: &dyn GraphQlClient,
    board: &Board,
    numbers: &[u64],
    page_size: u32,
) -> Result<Vec<ItemRef>> {
    if numbers.is_empty() {
        return Ok(Vec::new());
    }

    let members = board_members(client, board, page_size).await?;
    let targets = numbers
        .iter()
        .map(|&number| {
            members
                .get(&number)
                .map(|item_id| ItemRef {
                    number,
                    item_id: item_id.clone(),
                })
                .ok_or(ClientError::ItemNotReferenced(number))
        })
        .collect::<Result<Vec<_>>>()?;

    for target in &targets {
        client
            .execute(
                queries::DELETE_ITEM,
                variables(json!({ "id": board.id, "itemId": target.item_id })),
            )
            .await?;
        debug!(number = target.number, item_id = %target.item_id, "Removed item");
    }

    Ok(targets)
}

/// Map issue and pull request numbers to item ids. Drafts and redacted items
/// have no number and are skipped.
async fn board_members(
    client: &dyn GraphQlClient,
    board: &Board,
    page_size: u32,
) -> Result<HashMap<u64, String>> {
    let mut members = HashMap::new();
    let mut after: Option<String> = None;

    loop {
        let data: Data = execute_as(
            client,
            queries::PROJECT_ITEMS,
            variables(json!({
                "owner": board.repository.owner,
                "name": board.repository.name,
                "number": board.number,
                "first": page_size,
                "after": after,
            })),
        )
        .await?;

        let page = data
            .repository
            .and_then(|r| r.project)
            .map(|p| p.items)
            .unwrap_or_default();

        for item in page.nodes {
            if let Some(number) = item.content_number() {
                members.insert(number, item.id);
            }
        }

        match page.page_info.next_cursor() {
            Some(cursor) => after = Some(cursor.to_string()),
            None => break,
        }
    }

    debug!(number = board.number, items = members.len(), "Read board items");
    Ok(members)
}
