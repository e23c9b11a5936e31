//! GraphQL over HTTP.
//!
//! A GraphQL endpoint answers HTTP 200 even when the query failed; the
//! failure lives in the response envelope's `errors` array. This client
//! surfaces that as [`PipelineError::GraphQl`] before the `data` payload is
//! validated.

use reqwest::Method;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::client::{FetchClient, RequestOptions};
use crate::error::PipelineError;

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
    #[serde(default)]
    path: Option<Vec<Value>>,
}

impl ErrorEntry {
    fn describe(&self) -> String {
        match &self.path {
            Some(path) if !path.is_empty() => {
                let path: Vec<String> = path
                    .iter()
                    .map(|segment| match segment {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                format!("{} (at {})", self.message, path.join("."))
            }
            _ => self.message.clone(),
        }
    }
}

/// GraphQL client posting `{query, variables}` to a single endpoint.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: FetchClient,
    endpoint: String,
}

impl GraphQlClient {
    /// Creates a client posting to `endpoint` (relative to the client base).
    pub fn new(client: FetchClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the resolved endpoint URL.
    pub fn url(&self) -> String {
        self.client.url_for(&self.endpoint)
    }

    /// Runs a query and validates its `data` payload as `T`.
    ///
    /// # Errors
    ///
    /// Everything [`FetchClient::request`] returns, plus
    /// [`PipelineError::GraphQl`] when the envelope carries errors and
    /// [`PipelineError::Parse`] when `data` is missing or mis-shaped.
    #[instrument(skip(self, query, variables), fields(endpoint = %self.endpoint))]
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, PipelineError> {
        let body = json!({ "query": query, "variables": variables });
        let envelope: Envelope = self
            .client
            .request(Method::POST, &self.endpoint, Some(&body), &RequestOptions::default())
            .await?;

        let url = self.url();
        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.iter().map(ErrorEntry::describe).collect();
            debug!(count = messages.len(), "GraphQL response carried errors");
            return Err(PipelineError::GraphQl { url, messages });
        }

        let data = match envelope.data {
            Some(Value::Null) | None => {
                return Err(PipelineError::Parse {
                    url,
                    cause: "response carried no data".to_string(),
                });
            }
            Some(data) => data,
        };

        serde_json::from_value(data).map_err(|e| PipelineError::Parse {
            url,
            cause: e.to_string(),
        })
    }
}
