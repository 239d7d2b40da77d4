//! In-memory GraphQL client for unit tests.

use crate::error::{ClientError, GraphQlError, GraphQlErrors, Result};
use crate::graphql::{operation_name, GraphQlClient, Variables};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

type Handler = dyn Fn(&str, &Variables) -> Result<Value> + Send + Sync;
type Delay = dyn Fn(&str, &Variables) -> Option<Duration> + Send + Sync;

/// A recorded request.
#[derive(Debug, Clone)]
pub struct Call {
    pub operation: String,
    pub variables: Variables,
}

/// Answers requests with a handler keyed on operation name and records every call.
pub struct FakeClient {
    handler: Box<Handler>,
    delay: Option<Box<Delay>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeClient {
    pub fn new(handler: impl Fn(&str, &Variables) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering matching requests.
    pub fn with_delay(
        mut self,
        delay: impl Fn(&str, &Variables) -> Option<Duration> + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Variables of every call to `operation`, in call order.
    pub fn calls_to(&self, operation: &str) -> Vec<Variables> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == operation)
            .map(|c| c.variables)
            .collect()
    }
}

#[async_trait]
impl GraphQlClient for FakeClient {
    async fn execute(&self, document: &str, variables: Variables) -> Result<Value> {
        let operation = operation_name(document).to_string();
        self.calls.lock().unwrap().push(Call {
            operation: operation.clone(),
            variables: variables.clone(),
        });

        if let Some(delay) = self.delay.as_ref().and_then(|d| d(&operation, &variables)) {
            tokio::time::sleep(delay).await;
        }

        (self.handler)(&operation, &variables)
    }
}

pub fn unexpected(operation: &str) -> ClientError {
    ClientError::InvalidRequest(format!("unexpected operation {operation}"))
}

pub fn remote_error(error_type: &str, message: &str) -> ClientError {
    GraphQlErrors(vec![GraphQlError::new(Some(error_type), message)]).into()
}

pub fn var_u64(variables: &Variables, key: &str) -> u64 {
    variables.get(key).and_then(Value::as_u64).unwrap()
}

pub fn var_str<'a>(variables: &'a Variables, key: &str) -> &'a str {
    variables.get(key).and_then(Value::as_str).unwrap()
}

/// The `after` cursor of a paginated request, if any.
pub fn cursor(variables: &Variables) -> Option<&str> {
    variables.get("after").and_then(Value::as_str)
}

pub fn fields_page(nodes: Value, next: Option<&str>) -> Value {
    json!({
        "repository": {
            "projectV2": {
                "fields": {
                    "nodes": nodes,
                    "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
                }
            }
        }
    })
}

pub fn items_page(nodes: Value, total_count: usize, next: Option<&str>) -> Value {
    json!({
        "repository": {
            "projectV2": {
                "items": {
                    "totalCount": total_count,
                    "nodes": nodes,
                    "pageInfo": { "hasNextPage": next.is_some(), "endCursor": next }
                }
            }
        }
    })
}

pub fn content_id(id: &str) -> Value {
    json!({ "repository": { "issueOrPullRequest": { "id": id } } })
}

pub fn added_item(id: &str) -> Value {
    json!({ "addProjectV2ItemById": { "item": { "id": id } } })
}

pub fn updated_field(item_id: &str) -> Value {
    json!({ "updateProjectV2ItemFieldValue": { "projectV2Item": { "id": item_id } } })
}
