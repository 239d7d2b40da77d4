//! The GraphQL port everything in this crate is built on.

use crate::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Variables passed alongside a GraphQL document.
pub type Variables = Map<String, Value>;

/// Executes GraphQL queries and mutations against the remote API.
///
/// Implementations own connections, authentication, and any transport-level
/// timeouts. A response carrying an `errors` array is returned as
/// [`ClientError::GraphQl`](crate::ClientError::GraphQl).
#[async_trait]
pub trait GraphQlClient: Send + Sync {
    /// Execute `document` and return the response's `data` object.
    async fn execute(&self, document: &str, variables: Variables) -> Result<Value>;
}

/// Execute `document` and deserialize its `data` object.
pub(crate) async fn execute_as<T: DeserializeOwned>(
    client: &dyn GraphQlClient,
    document: &str,
    variables: Variables,
) -> Result<T> {
    let data = client.execute(document, variables).await?;
    Ok(serde_json::from_value(data)?)
}

/// Build variables from a `json!({...})` object; anything else is empty.
pub(crate) fn variables(value: Value) -> Variables {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// The operation name of a document, e.g. `AddProjectV2ItemById`.
#[must_use]
pub fn operation_name(document: &str) -> &str {
    document
        .split_whitespace()
        .skip_while(|word| *word != "query" && *word != "mutation")
        .nth(1)
        .map_or("anonymous", |name| {
            name.split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .next()
                .unwrap_or(name)
        })
}
