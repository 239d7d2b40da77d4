//! HTTP transport for the GraphQL API.

use crate::error::{ClientError, GraphQlError, GraphQlErrors, Result};
use crate::graphql::{operation_name, GraphQlClient, Variables};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

const USER_AGENT: &str = concat!("gh-projects/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends GraphQL documents over HTTPS with a bearer token.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    token: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport for a GraphQL endpoint.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'a str,
    variables: &'a Variables,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[async_trait]
impl GraphQlClient for HttpTransport {
    async fn execute(&self, document: &str, variables: Variables) -> Result<Value> {
        let operation = operation_name(document);
        debug!(operation, endpoint = %self.endpoint, "Executing GraphQL operation");
        trace!(operation, variables = %serde_json::Value::Object(variables.clone()), "Variables");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&Request {
                query: document,
                variables: &variables,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(operation, status = status.as_u16(), "GraphQL request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: extract_message(&body),
            });
        }

        let body: Response = response.json().await?;
        if !body.errors.is_empty() {
            debug!(operation, errors = body.errors.len(), "GraphQL operation returned errors");
            return Err(GraphQlErrors(body.errors).into());
        }

        Ok(body.data.unwrap_or(Value::Null))
    }
}

/// Pull `message` out of a JSON error body, falling back to the raw body.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
