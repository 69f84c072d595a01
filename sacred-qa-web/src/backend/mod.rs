//! Upstream agent service abstraction and HTTP implementation

mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Failures surfaced by the relay layer.
///
/// Every variant is recovered at the component that triggered it and turned
/// into a user-visible message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    /// The request never reached the backend, or no response came back
    #[error("Backend unreachable: {0}")]
    Network(String),

    /// The backend answered with a status >= 400
    #[error("Backend returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A required field was empty; caught before any network call
    #[error("{0}")]
    Validation(String),

    /// The backend answered 2xx with a body of the wrong shape
    #[error("Unexpected response from backend: {0}")]
    Decode(String),
}

impl RelayError {
    /// HTTP status of the failed exchange, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            RelayError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Upstream resources the relay knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// `/sankalpa` - create and list intentions
    Sankalpa,
    /// `/qa` - ask the agent a question
    Qa,
    /// `/qa_logs` - question/answer exchange history
    QaLogs,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Sankalpa => "/sankalpa",
            Resource::Qa => "/qa",
            Resource::QaLogs => "/qa_logs",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Trait for the upstream agent service.
///
/// Single attempt, fail fast: implementations never retry and never cache.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Base URL used for logging/identification
    fn base_url(&self) -> &str;

    /// `GET` a resource and return its records in upstream order
    async fn fetch_collection(&self, resource: Resource) -> Result<Vec<Value>, RelayError>;

    /// `POST` a JSON payload to a resource and return the response object
    async fn submit(&self, resource: Resource, payload: &Value) -> Result<Value, RelayError>;
}

/// Log and build a `Decode` failure for a 2xx exchange with the wrong shape
pub(crate) fn decode_error(resource: Resource, message: String) -> RelayError {
    warn!(resource = %resource, error = %message, "Unexpected response shape");
    RelayError::Decode(message)
}

/// Extract a human-readable message from a failed upstream body.
///
/// The agent service reports errors as `{"detail": "..."}`; other bodies are
/// passed through as text.
pub(crate) fn upstream_message(body: &str, fallback: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(other) if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }
    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.to_string()
    }
}
