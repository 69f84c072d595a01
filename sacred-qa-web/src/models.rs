//! Records exchanged with the agent service

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user-submitted intention, as listed by `GET /sankalpa`.
///
/// Every field is optional on the wire; absent values render as empty cells.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Intention {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
}

impl Intention {
    /// First eight characters of the identifier
    pub fn short_id(&self) -> String {
        self.id
            .as_deref()
            .map(|id| id.chars().take(8).collect())
            .unwrap_or_default()
    }
}

/// One question/answer exchange, as listed by `GET /qa_logs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QaLogEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub agent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub device: Option<String>,
    #[serde(default)]
    pub request_json: Value,
    #[serde(default)]
    pub response_json: Value,
}

impl QaLogEntry {
    /// The prompt from the request payload, or the compact payload itself
    pub fn request_summary(&self) -> String {
        match &self.request_json {
            Value::Null => String::new(),
            Value::Object(map) => match map.get("prompt") {
                Some(Value::String(prompt)) => prompt.clone(),
                _ => self.request_json.to_string(),
            },
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Body of `POST /sankalpa`
#[derive(Debug, Clone, Serialize)]
pub struct NewIntention<'a> {
    pub text: &'a str,
    pub context: &'a str,
}

/// Body of `POST /qa`
#[derive(Debug, Clone, Serialize)]
pub struct Question<'a> {
    pub prompt: &'a str,
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS` when it parses as RFC 3339,
/// otherwise verbatim.
pub fn display_timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Err(_) => raw.to_string(),
        },
        None => String::new(),
    }
}

/// Pretty-print an arbitrary JSON payload with two-space indentation
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Accept strings, numbers and booleans as text; null and absent become `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
