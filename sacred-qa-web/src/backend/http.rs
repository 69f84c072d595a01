//! reqwest-backed client for the upstream agent service

use super::{decode_error, upstream_message, Backend, RelayError, Resource};
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the agent service
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a new client against `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, resource: Resource) -> String {
        format!("{}{}", self.base_url, resource.path())
    }

    /// Turn a non-2xx response into an upstream failure, or parse the body
    async fn read_json(resource: Resource, response: Response) -> Result<Value, RelayError> {
        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed");
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(&body, reason);
            warn!(
                resource = %resource,
                status = status.as_u16(),
                error = %message,
                "Upstream request failed"
            );
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| decode_error(resource, format!("{} body is not JSON: {}", resource, e)))
    }
}

fn network_error(resource: Resource, e: reqwest::Error) -> RelayError {
    warn!(resource = %resource, error = %e, "Backend request did not complete");
    if e.is_timeout() {
        RelayError::Network(format!("request to {} timed out", resource))
    } else {
        RelayError::Network(e.to_string())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_collection(&self, resource: Resource) -> Result<Vec<Value>, RelayError> {
        debug!(resource = %resource, "Fetching collection");

        let response = self
            .client
            .get(self.url(resource))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| network_error(resource, e))?;

        match Self::read_json(resource, response).await? {
            Value::Array(records) => Ok(records),
            other => Err(decode_error(
                resource,
                format!("{} returned {} instead of a list", resource, json_kind(&other)),
            )),
        }
    }

    async fn submit(&self, resource: Resource, payload: &Value) -> Result<Value, RelayError> {
        debug!(resource = %resource, "Submitting payload");

        let body = serde_json::to_vec(payload)
            .map_err(|e| decode_error(resource, format!("payload is not serializable: {}", e)))?;

        let response = self
            .client
            .post(self.url(resource))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| network_error(resource, e))?;

        match Self::read_json(resource, response).await? {
            object @ Value::Object(_) => Ok(object),
            other => Err(decode_error(
                resource,
                format!("{} returned {} instead of an object", resource, json_kind(&other)),
            )),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
