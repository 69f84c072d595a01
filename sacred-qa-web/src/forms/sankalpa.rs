//! Intention submission form

use super::{FormError, FormMachine, FormState, Notice};
use crate::backend::{Backend, RelayError, Resource};
use crate::models::NewIntention;
use serde_json::Value;
use tracing::info;

/// Captures one sankalpa and posts it with the configured context tag
#[derive(Debug)]
pub struct SankalpaForm {
    text: String,
    context: String,
    machine: FormMachine,
}

impl SankalpaForm {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            context: context.into(),
            machine: FormMachine::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> FormState {
        self.machine.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.machine.notice.as_ref()
    }

    /// Post the current text. On success the input is cleared and the new
    /// identifier (if the backend returned one) is reported; on failure the
    /// text is kept.
    pub async fn submit(&mut self, backend: &dyn Backend) -> Result<Option<String>, FormError> {
        self.machine.begin("Sankalpa", &self.text)?;

        let payload = serde_json::to_value(NewIntention {
            text: &self.text,
            context: &self.context,
        })
        .map_err(|e| RelayError::Decode(e.to_string()));

        let result = match payload {
            Ok(payload) => backend.submit(Resource::Sankalpa, &payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                let id = match response.get("id") {
                    Some(Value::String(id)) => Some(id.clone()),
                    Some(Value::Null) | None => None,
                    Some(other) => Some(other.to_string()),
                };
                info!(id = ?id, "Sankalpa created");

                let message = match &id {
                    Some(id) => format!("Sankalpa created: {}", id),
                    None => "Sankalpa created".to_string(),
                };
                self.text.clear();
                self.machine.succeed(Some(Notice::Success(message)));
                Ok(id)
            }
            Err(e) => Err(self.machine.fail("sankalpa", e)),
        }
    }
}
