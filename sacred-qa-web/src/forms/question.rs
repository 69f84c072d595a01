//! Free-form question relayed to the agent

use super::{FormError, FormMachine, FormState, Notice};
use crate::backend::{Backend, RelayError, Resource};
use crate::models::{pretty_json, Question};
use serde_json::Value;
use tracing::info;

/// Captures a prompt and shows the agent's structured answer
#[derive(Debug)]
pub struct QuestionForm {
    prompt: String,
    response: Option<String>,
    machine: FormMachine,
}

impl Default for QuestionForm {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionForm {
    pub fn new() -> Self {
        Self {
            prompt: String::new(),
            response: None,
            machine: FormMachine::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Pretty-printed answer from the last successful submission
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn state(&self) -> FormState {
        self.machine.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.machine.notice.as_ref()
    }

    /// Post the prompt. The `data` member of the agent's envelope is kept,
    /// pretty-printed, as the displayed answer.
    pub async fn submit(&mut self, backend: &dyn Backend) -> Result<&str, FormError> {
        self.machine.begin("Question", &self.prompt)?;
        self.response = None;

        let payload = serde_json::to_value(Question {
            prompt: &self.prompt,
        })
        .map_err(|e| RelayError::Decode(e.to_string()));

        let result = match payload {
            Ok(payload) => backend.submit(Resource::Qa, &payload).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(envelope) => {
                let agent = envelope.get("agent").and_then(Value::as_str).unwrap_or("unknown");
                info!(agent, "Question answered");

                let answer = match envelope.get("data") {
                    Some(data) => pretty_json(data),
                    None => pretty_json(&envelope),
                };
                self.machine.succeed(None);
                Ok(self.response.insert(answer).as_str())
            }
            Err(e) => Err(self.machine.fail("question", e)),
        }
    }
}
