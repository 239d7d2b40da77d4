//! Resolving `name=value` assignments against a board's field schema.

use super::{Board, FieldMap};
use crate::error::Result;
use crate::graphql::{execute_as, variables, GraphQlClient};
use crate::queries;
use projects_core::{
    Connection, CoreError, FieldAssignment, FieldAssignments, FieldValue, ProjectField,
    ResolvedField,
};
use serde::Deserialize;
use serde_json::json;
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
    fields: Connection<ProjectField>,
}

/// Match every assignment to a board field and convert its value.
///
/// Pages of `page_size` fields are fetched until every name has matched,
/// case-insensitively. A name is not looked for again once matched.
///
/// # Errors
/// Returns `CoreError::FieldNotDefined` for the first assignment, in the order
/// given, that matched no field on any page. Conversion errors from
/// [`FieldValue::resolve`] and remote errors are returned as is.
pub async fn resolve_fields(
    client: &dyn GraphQlClient,
    board: &Board,
    assignments: &FieldAssignments,
    page_size: u32,
) -> Result<FieldMap> {
    let mut outstanding: Vec<&FieldAssignment> = assignments.iter().collect();
    let mut resolved = FieldMap::with_capacity(outstanding.len());
    let mut after: Option<String> = None;

    while !outstanding.is_empty() {
        let page = fetch_page(client, board, page_size, after.as_deref()).await?;
        debug!(
            number = board.number,
            fields = page.nodes.len(),
            outstanding = outstanding.len(),
            "Fetched field page"
        );

        let mut remaining = Vec::with_capacity(outstanding.len());
        for assignment in outstanding {
            let Some(field) = page.nodes.iter().find(|f| f.is_named(&assignment.name)) else {
                remaining.push(assignment);
                continue;
            };

            let value = FieldValue::resolve(field, &assignment.name, &assignment.value)?;
            resolved.insert(
                assignment.name.clone(),
                ResolvedField {
                    id: field.id.clone(),
                    name: assignment.name.clone(),
                    value,
                },
            );
        }
        outstanding = remaining;

        if let Some(first) = outstanding.first() {
            match page.page_info.next_cursor() {
                Some(cursor) => after = Some(cursor.to_string()),
                None => return Err(CoreError::FieldNotDefined(first.name.clone()).into()),
            }
        }
    }

    Ok(resolved)
}

async fn fetch_page(
    client: &dyn GraphQlClient,
    board: &Board,
    page_size: u32,
    after: Option<&str>,
) -> Result<Connection<ProjectField>> {
    let data: Data = execute_as(
        client,
        queries::PROJECT_FIELDS,
        variables(json!({
            "owner": board.repository.owner,
            "name": board.repository.name,
            "number": board.number,
            "first": page_size,
            "after": after,
        })),
    )
    .await?;

    Ok(data
        .repository
        .and_then(|r| r.project)
        .map(|p| p.fields)
        .unwrap_or_default())
}
