//! End-to-end tests of `HttpTransport` and `Projects` against a mock GraphQL server.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use projects_client::graphql::operation_name;
use projects_client::{
    ClientConfig, ClientError, EditRequest, GraphQlClient, HttpTransport, Projects,
};
use projects_core::{FieldAssignments, Repository};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Reply = dyn Fn(&str, &Value) -> (StatusCode, Value) + Send + Sync;

#[derive(Debug, Clone)]
struct Recorded {
    operation: String,
    variables: Value,
    authorization: Option<String>,
}

#[derive(Clone)]
struct MockState {
    reply: Arc<Reply>,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

struct MockServer {
    url: String,
    state: MockState,
}

impl MockServer {
    async fn start(
        reply: impl Fn(&str, &Value) -> (StatusCode, Value) + Send + Sync + 'static,
    ) -> Self {
        let state = MockState {
            reply: Arc::new(reply),
            calls: Arc::default(),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/graphql"),
            state,
        }
    }

    fn calls(&self) -> Vec<Recorded> {
        self.state.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, operation: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .map(|c| c.variables)
            .collect()
    }

    fn projects(&self, worker_count: usize) -> Projects {
        let transport = HttpTransport::new(&self.url, "test-token").unwrap();
        Projects::new(
            Arc::new(transport),
            Repository::new("heaths", "gh-projects"),
            ClientConfig::default().with_worker_count(worker_count),
        )
    }
}

async fn graphql(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let query = body["query"].as_str().unwrap_or_default();
    let operation = operation_name(query).to_string();
    let variables = body["variables"].clone();

    state.calls.lock().unwrap().push(Recorded {
        operation: operation.clone(),
        variables: variables.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    });

    let (status, reply) = (state.reply)(&operation, &variables);
    (status, Json(reply))
}

fn data(value: Value) -> (StatusCode, Value) {
    (StatusCode::OK, json!({ "data": value }))
}

fn error(error_type: &str, message: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({ "data": null, "errors": [{ "type": error_type, "message": message }] }),
    )
}

fn unexpected(operation: &str) -> (StatusCode, Value) {
    (
        StatusCode::BAD_REQUEST,
        json!({ "message": format!("unexpected operation {operation}") }),
    )
}

fn page(next: Option<&str>) -> Value {
    json!({ "hasNextPage": next.is_some(), "endCursor": next })
}

/// Board #1 linked to heaths/gh-projects, with "Status" on the second page of fields.
fn board(operation: &str, variables: &Value) -> (StatusCode, Value) {
    let after = variables["after"].as_str();
    match operation {
        "RepositoryProjectV2Id" => data(json!({
            "viewer": { "id": "U_1" },
            "repository": {
                "projectV2": {
                    "id": "PVT_1",
                    "number": 1,
                    "url": "https://github.com/users/heaths/projects/1",
                    "public": false
                }
            }
        })),
        "RepositoryProjectV2Fields" => {
            let (nodes, next) = if after.is_none() {
                (
                    json!([
                        { "id": "F_TITLE", "name": "Title", "dataType": "TITLE" },
                        { "id": "F_COST", "name": "Cost", "dataType": "NUMBER" }
                    ]),
                    Some("fields2"),
                )
            } else {
                (
                    json!([{
                        "id": "F_STATUS",
                        "name": "Status",
                        "dataType": "SINGLE_SELECT",
                        "options": [
                            { "id": "O_TODO", "name": "Todo" },
                            { "id": "O_DONE", "name": "Done" }
                        ]
                    }]),
                    None,
                )
            };
            data(json!({
                "repository": { "projectV2": { "fields": { "nodes": nodes, "pageInfo": page(next) } } }
            }))
        }
        "RepositoryIssueOrPullRequestId" => match variables["number"].as_u64() {
            Some(99) => error(
                "NOT_FOUND",
                "Could not resolve to an issue or pull request with the number of 99.",
            ),
            Some(n) => data(json!({ "repository": { "issueOrPullRequest": { "id": format!("C_{n}") } } })),
            None => unexpected(operation),
        },
        "AddProjectV2ItemById" => {
            let content = variables["contentId"].as_str().unwrap_or_default();
            let item = content.replace("C_", "I_");
            data(json!({ "addProjectV2ItemById": { "item": { "id": item } } }))
        }
        "UpdateProjectV2ItemFieldValue" => data(json!({
            "updateProjectV2ItemFieldValue": { "projectV2Item": { "id": variables["itemId"] } }
        })),
        "RepositoryProjectV2Items" => {
            let (nodes, next) = if after.is_none() {
                (
                    json!([
                        { "id": "I_1", "type": "ISSUE", "content": { "id": "C_1", "number": 1 } },
                        { "id": "I_D", "type": "DRAFT_ISSUE", "content": {} }
                    ]),
                    Some("items2"),
                )
            } else {
                (
                    json!([{ "id": "I_2", "type": "PULL_REQUEST", "content": { "id": "C_2", "number": 2 } }]),
                    None,
                )
            };
            data(json!({
                "repository": {
                    "projectV2": { "items": { "totalCount": 3, "nodes": nodes, "pageInfo": page(next) } }
                }
            }))
        }
        "DeleteProjectV2Item" => data(json!({
            "deleteProjectV2Item": { "deletedItemId": variables["itemId"] }
        })),
        _ => unexpected(operation),
    }
}

#[tokio::test]
async fn test_add_items_with_field_on_second_page() {
    let server = MockServer::start(board).await;
    let projects = server.projects(1);

    let fields: FieldAssignments = [("Status", "Done")].into_iter().collect();
    let outcome = projects
        .edit(&EditRequest::new(1).with_add([2, 3]).with_fields(fields))
        .await
        .unwrap();

    assert_eq!(outcome.url, "https://github.com/users/heaths/projects/1");
    assert!(!outcome.updated);
    assert_eq!(
        outcome.added.iter().map(|i| i.number).collect::<Vec<_>>(),
        [2, 3]
    );
    assert_eq!(server.calls_to("RepositoryProjectV2Fields").len(), 2);

    let attached: Vec<Value> = server
        .calls_to("AddProjectV2ItemById")
        .into_iter()
        .map(|v| v["contentId"].clone())
        .collect();
    assert_eq!(attached, [json!("C_2"), json!("C_3")]);

    let updates = server.calls_to("UpdateProjectV2ItemFieldValue");
    assert_eq!(updates.len(), 2);
    for update in &updates {
        assert_eq!(update["fieldId"], json!("F_STATUS"));
        assert_eq!(update["value"], json!({ "singleSelectOptionId": "O_DONE" }));
    }

    assert!(server
        .calls()
        .iter()
        .all(|c| c.authorization.as_deref() == Some("Bearer test-token")));
}

#[tokio::test]
async fn test_add_missing_item_attaches_nothing() {
    let server = MockServer::start(board).await;
    let projects = server.projects(5);

    let err = projects
        .edit(&EditRequest::new(1).with_add([99]))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::ItemNotFound { number: 99, .. }));
    assert_eq!(
        err.to_string(),
        "GraphQL: Could not resolve to an issue or pull request with the number of 99."
    );
    assert!(server.calls_to("AddProjectV2ItemById").is_empty());
    assert!(server.calls_to("UpdateProjectV2ItemFieldValue").is_empty());
}

#[tokio::test]
async fn test_remove_item_found_on_second_page() {
    let server = MockServer::start(board).await;
    let projects = server.projects(5);

    let outcome = projects
        .edit(&EditRequest::new(1).with_remove([2]))
        .await
        .unwrap();

    assert_eq!(outcome.removed.len(), 1);
    assert_eq!(server.calls_to("RepositoryProjectV2Items").len(), 2);

    let deletes = server.calls_to("DeleteProjectV2Item");
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0]["itemId"], json!("I_2"));
    assert_eq!(deletes[0]["id"], json!("PVT_1"));
}

#[tokio::test]
async fn test_status_error_uses_message() {
    let server = MockServer::start(|_, _| {
        (
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Bad credentials", "documentation_url": "https://docs.github.com" }),
        )
    })
    .await;
    let transport = HttpTransport::new(&server.url, "bad").unwrap();

    let err = transport
        .execute("query Viewer { viewer { id } }", serde_json::Map::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Status { status: 401, ref body } if body == "Bad credentials"
    ));
}

#[tokio::test]
async fn test_graphql_errors_keep_type() {
    let server = MockServer::start(|_, _| {
        error(
            "INSUFFICIENT_SCOPES",
            "Your token has not been granted the required scopes.",
        )
    })
    .await;
    let transport = HttpTransport::new(&server.url, "token").unwrap();

    let err = transport
        .execute("query Viewer { viewer { id } }", serde_json::Map::new())
        .await
        .unwrap_err();

    assert!(err.has_graphql_type("insufficient_scopes"));
    assert_eq!(
        err.to_string(),
        "GraphQL: Your token has not been granted the required scopes."
    );
}
